// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! Inserts read the assigned id back through
//! [`PersistenceBackend::get_last_insert_rowid`](crate::backend::PersistenceBackend).

pub mod records;
pub mod users;
