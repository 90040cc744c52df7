//! Postal address columns.

use activerecord_core::{ColumnDef, Result};

use super::text_column;
use crate::model::{Bundle, Model, TableBuilder};
use crate::record::Record;

pub const ADDRESS_ADDRESS: &str = "address_address";
pub const ADDRESS_ZIPCODE: &str = "address_zipcode";
pub const ADDRESS_CITY: &str = "address_city";
pub const ADDRESS_COUNTRY: &str = "address_country";

/// Adds four nullable `VARCHAR(1024)` address columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct Address;

impl Bundle for Address {
    fn contribute(&self, t: &mut TableBuilder) -> Result<()> {
        for name in [ADDRESS_ADDRESS, ADDRESS_ZIPCODE, ADDRESS_CITY, ADDRESS_COUNTRY] {
            t.column(ColumnDef::new(name).sql_type("VARCHAR").length(1024))?;
        }
        Ok(())
    }
}

/// Typed accessors for records with the [`Address`] bundle.
pub trait AddressExt: Sized {
    fn address(&self) -> Result<Option<String>>;
    fn set_address(&mut self, address: Option<&str>) -> Result<&mut Self>;
    fn zipcode(&self) -> Result<Option<String>>;
    fn set_zipcode(&mut self, zipcode: Option<&str>) -> Result<&mut Self>;
    fn city(&self) -> Result<Option<String>>;
    fn set_city(&mut self, city: Option<&str>) -> Result<&mut Self>;
    fn country(&self) -> Result<Option<String>>;
    fn set_country(&mut self, country: Option<&str>) -> Result<&mut Self>;
}

impl<M: Model> AddressExt for Record<M> {
    fn address(&self) -> Result<Option<String>> {
        text_column(self, ADDRESS_ADDRESS)
    }

    fn set_address(&mut self, address: Option<&str>) -> Result<&mut Self> {
        self.set(ADDRESS_ADDRESS, address)
    }

    fn zipcode(&self) -> Result<Option<String>> {
        text_column(self, ADDRESS_ZIPCODE)
    }

    fn set_zipcode(&mut self, zipcode: Option<&str>) -> Result<&mut Self> {
        self.set(ADDRESS_ZIPCODE, zipcode)
    }

    fn city(&self) -> Result<Option<String>> {
        text_column(self, ADDRESS_CITY)
    }

    fn set_city(&mut self, city: Option<&str>) -> Result<&mut Self> {
        self.set(ADDRESS_CITY, city)
    }

    fn country(&self) -> Result<Option<String>> {
        text_column(self, ADDRESS_COUNTRY)
    }

    fn set_country(&mut self, country: Option<&str>) -> Result<&mut Self> {
        self.set(ADDRESS_COUNTRY, country)
    }
}
