// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! - `records`: entity records by type and id
//! - `users`: accounts, sessions and password verification

pub mod records;
pub mod users;
