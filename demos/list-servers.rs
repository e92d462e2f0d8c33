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

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Server {
    pub id: String,
    pub name: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ServersRoot {
    pub servers: Vec<Server>,
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let session = raxcloud::from_env().expect("Failed to create a session from the environment");
    let cloud = raxcloud::Cloud::from_session(session)
        .await
        .expect("Cannot log in");

    let servers = cloud.servers().await.expect("No compute service");
    let result = servers
        .list(&Default::default(), true)
        .await
        .expect("Cannot list servers");
    let root: ServersRoot = serde_json::from_value(result).expect("Unexpected response");
    for srv in root.servers {
        println!("ID = {}, Name = {}, Status = {}", srv.id, srv.name, srv.status);
    }
    println!("Done listing");
}
