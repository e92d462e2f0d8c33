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

use raxcloud::compute::{FlavorQuery, Flavors};
use raxcloud::sync::SyncSession;

fn main() {
    env_logger::init();

    let session = SyncSession::new(
        raxcloud::from_env().expect("Failed to create a session from the environment"),
    )
    .expect("Cannot create a runtime");
    session.login().expect("Cannot log in");

    let catalog = session.catalog().expect("No service catalog");
    let flavors = Flavors::new(session.session(), &catalog).expect("No compute service");
    let query = FlavorQuery {
        min_ram: Some(1024),
        ..FlavorQuery::default()
    };
    let list = session
        .block_on(flavors.list(&query, true))
        .expect("Cannot list flavors");
    println!("{:#}", list);
}
