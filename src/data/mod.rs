// mod.rs - Input data handling module

pub mod attributes;
pub mod clinical;
pub mod formats;
pub mod idlist;

pub use attributes::{import_attributes, import_resistance, AttributeImport};
pub use clinical::{import_edi_json, import_edi_legacy, ClinicalRecord, DiseaseStage};
pub use formats::{IdFormat, ParsedId};
pub use idlist::{load_sequence_ids, FastaIdScanner};
