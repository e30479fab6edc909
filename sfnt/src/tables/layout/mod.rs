pub mod common;
pub mod gdef;
pub mod gpos;
pub mod gsub;

pub use common::{
    ClassDef, Coverage, Feature, FeatureList, LangSys, Lookup, LookupList, Script, ScriptList,
};
pub use gdef::Gdef;
pub use gpos::Gpos;
pub use gsub::Gsub;
