//! Office Open XML (OOXML) binary part formats.
//!
//! Only the Excel binary workbook (`xlsb`) parts are decoded here. Opening
//! the ZIP container and following its relationships is left to the caller,
//! which hands each part's bytes to the matching decoder.

pub mod xlsb;
