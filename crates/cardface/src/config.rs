//! The YAML collection file.
//!
//! ```yaml
//! decks:
//!   - { id: 1, name: "Languages::Japanese" }
//! notetypes:
//!   - id: 1
//!     name: Basic
//!     fields: [Front, Back]
//!     css: ".card { font-family: serif; }"
//!     templates:
//!       - name: Card 1
//!         qfmt: "{{Front}}"
//!         afmt: "{{FrontSide}}<hr>{{Back}}"
//! notes:
//!   - { id: 1, notetype_id: 1, fields: [[Front, "猫"], [Back, cat]], tags: [animals] }
//! cards:
//!   - { id: 1, note_id: 1, ord: 0, deck_id: 1 }
//! voices:
//!   - { name: Kyoko, lang: ja_JP }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use cardface_engine::{CollectionData, MemoryCollection};
use cardface_render::{PlayTagMode, TtsVoice};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionFile {
    #[serde(flatten)]
    pub collection: CollectionData,
    /// Text-to-speech voices treated as installed.
    #[serde(default)]
    pub voices: Vec<TtsVoice>,
}

impl CollectionFile {
    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&source).with_context(|| format!("invalid collection file {}", path.display()))
    }

    pub fn parse(source: &str) -> Result<Self> {
        let file: CollectionFile = serde_yaml::from_str(source)?;
        tracing::debug!(
            cards = file.collection.cards.len(),
            notes = file.collection.notes.len(),
            voices = file.voices.len(),
            "loaded collection"
        );
        Ok(file)
    }

    pub fn into_collection(self, mode: PlayTagMode) -> (MemoryCollection, Vec<TtsVoice>) {
        (
            MemoryCollection::from_data(self.collection).with_play_tag_mode(mode),
            self.voices,
        )
    }
}
