//! Flat-file input and output.

mod csv;

pub use self::csv::{
    read_panel, write_bandwidth_table, write_distance_table, write_parameter_table,
    write_pvalue_table, write_r2_table, write_tables, write_tstat_table, write_weight_table,
    PanelIoError, PanelSchema,
};
