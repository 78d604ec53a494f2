// sound-world -- note names, frequencies and envelopes for programmatic sound control
// Copyright (C) 2021  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

// Music theory
pub mod midi;
pub mod note;
pub mod theory;
pub mod tuning;

// Controlling sound over time
pub mod automation;
pub mod clock;
pub mod envelope;
pub mod graph;

pub mod cli;
