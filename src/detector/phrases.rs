// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text queries used to probe the detection model for storefront state

/// Fixed query list sent to the zero-shot detector, in label-index order.
pub const STOREFRONT_PHRASES: [&str; 6] = [
    "an open shop entrance with visible interior",
    "a closed shop with metal shutter pulled down",
    "shop door open",
    "shop shutter closed",
    "store entrance open",
    "rolling shutter down",
];
