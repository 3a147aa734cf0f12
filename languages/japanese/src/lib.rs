//! Japanese dictionary formats.

pub mod entry;
pub mod kana;
pub mod kanjidic;
pub mod loader;


use std::sync::Arc;

use shirabe_core::registry::DictionaryRegistry;

pub use entry::{InflectedReading, KanjiEntry};
pub use kanjidic::{EntryListIter, KanjiDic, KanjiDicImplementation};

/// Register every format of this crate.
pub fn register(registry: &mut DictionaryRegistry) {
    registry.register(Arc::new(KanjiDicImplementation));
}
