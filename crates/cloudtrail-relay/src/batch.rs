// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::iter::FusedIterator;
use std::num::NonZeroUsize;

/// Splits an owned, ordered sequence into consecutive batches of at most `batch_size`.
///
/// Every batch but the last holds exactly `batch_size` items. Items are handed out
/// once, in their original order.
#[derive(Debug)]
pub struct Batches<T> {
    items: std::vec::IntoIter<T>,
    batch_size: NonZeroUsize,
}

impl<T> Batches<T> {
    pub fn new(items: Vec<T>, batch_size: NonZeroUsize) -> Self {
        Self {
            items: items.into_iter(),
            batch_size,
        }
    }

    /// Number of items not yet handed out in a batch.
    pub fn remaining(&self) -> usize {
        self.items.len()
    }
}

impl<T> Iterator for Batches<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let batch: Vec<T> = self.items.by_ref().take(self.batch_size.get()).collect();
        if batch.is_empty() {
            None
        } else {
            Some(batch)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let batches = self.remaining().div_ceil(self.batch_size.get());
        (batches, Some(batches))
    }
}

impl<T> ExactSizeIterator for Batches<T> {}

impl<T> FusedIterator for Batches<T> {}
