pub mod enrichment_table;
pub mod input_source;
