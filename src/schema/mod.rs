mod definition;
mod registry;
mod tables;
mod verifier;

pub use definition::{AutoTimestamp, ColumnDefault, FieldDef, FieldType, TableDef};
pub use registry::{
    SchemaOptions, SchemaRegistry, LABELS, REPORT_LABELS, REPORT_METADATA, SCENARIO_LABELS,
    SCENARIO_METADATA, TIMESERIES_DATA, USERS,
};
pub use tables::{compute_checksum, TableDeployResult, TableDeployer, TRACKING_TABLE};
pub use verifier::{compare, LiveColumn, LiveTable, SchemaVerifier, TableMismatch, VerificationResult};
