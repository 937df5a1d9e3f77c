// Copyright © 2021 The dataitem Contributors
//
// This file is part of dataitem, distributed under the GPLv3 with
// Linking Exception. For full terms see the included LICENSE file.

//! An opt-in per-thread free-list of growable output buffers (spec.md
//! §5). Only consulted when `Limits::allow_buffer_caching` is set; by
//! default every `VecOutput` simply allocates.

use std::cell::RefCell;

thread_local! {
    static SLOT: RefCell<Option<Vec<u8>>> = RefCell::new(None);
}

pub(crate) fn take(min_capacity: usize) -> Vec<u8> {
    SLOT.with(|slot| match slot.borrow_mut().take() {
        Some(mut buf) => {
            tracing::debug!(capacity = buf.capacity(), "buffer pool hit");
            buf.clear();
            buf.reserve(min_capacity.saturating_sub(buf.capacity()));
            buf
        }
        None => {
            tracing::debug!(min_capacity, "buffer pool miss, allocating");
            Vec::with_capacity(min_capacity)
        }
    })
}

pub(crate) fn give_back(buf: Vec<u8>) {
    SLOT.with(|slot| {
        *slot.borrow_mut() = Some(buf);
    });
}
