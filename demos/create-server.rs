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

#[tokio::main]
async fn main() {
    env_logger::init();

    let mut args = env::args().skip(1);
    let name = args.next().expect("Provide a server name");
    let image = args.next().expect("Provide an image ID");
    let flavor = args.next().unwrap_or_else(|| "2".to_string());

    let session = raxcloud::from_env().expect("Failed to create a session from the environment");
    session.login().await.expect("Cannot log in");
    let catalog = session.catalog().await.expect("No service catalog");
    let servers =
        raxcloud::compute::Servers::new(&session, &catalog).expect("No compute service");

    let request = raxcloud::compute::NewServer::new(name, image, flavor)
        .with_metadata("created-by", "raxcloud");
    let server = servers
        .create_and_wait(&request)
        .await
        .expect("Cannot create a server");

    println!(
        "Server {} is {}, admin password {}",
        server["server"]["id"], server["server"]["status"], server["server"]["adminPass"]
    );
}
