// Copyright 2019 Dmitry Tantsur <divius.inside@gmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Next generation compute service: servers, images and flavors.
//!
//! All calls return the parsed JSON response unchanged.

mod flavors;
mod images;
mod servers;

pub use flavors::{FlavorQuery, Flavors};
pub use images::{ImageQuery, ImageType, Images};
pub use servers::{
    poll_until_ready, AdminPassword, NewServer, Personality, RebootType, RebuildServer,
    ServerQuery, Servers, DEFAULT_POLL_INTERVAL,
};
