pub mod gene_sets;
pub mod selection;
