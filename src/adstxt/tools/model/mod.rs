use std::fmt;

/// Identity of an authorization entry. Two entries with the same key are the
/// same entry, whatever their authority id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey {
    pub advertiser: String,
    pub account_id: String,
    pub relationship: String,
}

/// A fragment line after parsing, before the authority table is consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    /// Advertiser domain, lower-cased.
    pub advertiser: String,
    pub account_id: String,
    /// Relationship kept verbatim (`DIRECT`, `RESELLER`, ...).
    pub relationship: String,
    /// Authority id given explicitly as a fourth field.
    pub authority_id: Option<String>,
}

impl ParsedRow {
    /// Finalises the row. A table entry always wins over an explicit fourth
    /// field.
    pub fn into_record(self, table_authority: Option<&str>) -> Record {
        let authority_id = match table_authority {
            Some(id) => id.to_string(),
            None => self.authority_id.unwrap_or_default(),
        };
        Record {
            advertiser: self.advertiser,
            account_id: self.account_id,
            relationship: self.relationship,
            authority_id,
        }
    }
}

/// A finished authorization entry as it is written to the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    advertiser: String,
    account_id: String,
    relationship: String,
    authority_id: String,
}

impl Record {
    /// Authority id, `None` when neither the table nor the row supplied one.
    pub fn authority_id(&self) -> Option<&str> {
        (!self.authority_id.is_empty()).then_some(self.authority_id.as_str())
    }

    pub fn key(&self) -> RecordKey {
        RecordKey {
            advertiser: self.advertiser.clone(),
            account_id: self.account_id.clone(),
            relationship: self.relationship.clone(),
        }
    }

    /// Serialised output line, `advertiser,account,relationship[,authority]`.
    pub fn row(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.advertiser, self.account_id, self.relationship)?;
        if let Some(authority) = self.authority_id() {
            write!(f, ",{authority}")?;
        }
        Ok(())
    }
}
