pub mod entities;
pub mod filter;
pub mod pagination;
pub mod table_model;

#[cfg(test)]
pub mod test_support;
