// Copyright (c) 2024 Mike Tsao

use derivative::Derivative;
use serde::{Deserialize, Serialize};
use synonym::Synonym;

/// [ModSerial] counts modifications to a model so that derived views (a
/// compiled staff, a rendered grid) know when to rebuild. A view keeps its own
/// usize, compares it against the model's current serial, and catches up when
/// they differ.
#[derive(Synonym, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[synonym(skip(Default))]
#[serde(rename_all = "kebab-case")]
pub struct ModSerial(
    // Not usize::default(), so that a view starting at zero rebuilds on its
    // first check.
    #[derivative(Default(value = "1000"))] pub usize,
);
impl ModSerial {
    /// Records one modification.
    pub fn bump(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    /// Compares against a view's last-known serial and brings it up to date.
    /// Returns true if the view was stale.
    pub fn catch_up(&self, last_known: &mut usize) -> bool {
        let is_stale = self.0 != *last_known;
        *last_known = self.0;
        is_stale
    }
}
