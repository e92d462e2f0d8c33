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

use std::env;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Domain {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct DomainsRoot {
    pub domains: Vec<Domain>,
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let filter = env::args().nth(1);

    let session = raxcloud::from_env().expect("Failed to create a session from the environment");
    let cloud = raxcloud::Cloud::from_session(session)
        .await
        .expect("Cannot log in");

    let domains = cloud.domains().await.expect("No DNS service");
    let records = cloud.records().await.expect("No DNS service");
    let result = domains
        .list(filter.as_deref())
        .await
        .expect("Cannot list domains");
    let root: DomainsRoot = serde_json::from_value(result).expect("Unexpected response");
    for domain in root.domains {
        println!("ID = {}, Name = {}", domain.id, domain.name);
        let list = records
            .list(domain.id)
            .await
            .expect("Cannot list records");
        println!("{:#}", list);
    }
}
