pub mod authorities;
pub mod diagnostics;
pub mod fragments;
pub mod output;
