// Copyright 2026 FedSQL Contributors
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

use std::process::Command;

fn main() {
    println!("cargo:rerun-if-env-changed=FEDSQL_GIT_COMMIT");
    println!("cargo:rerun-if-changed=.git/HEAD");

    // An externally supplied commit (release builds) wins over git discovery
    if std::env::var("FEDSQL_GIT_COMMIT").is_ok() {
        return;
    }
    if let Some(commit) = head_commit() {
        println!("cargo:rustc-env=FEDSQL_GIT_COMMIT={}", commit);
    }
}

fn head_commit() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let commit = String::from_utf8(output.stdout).ok()?;
    let commit = commit.trim();
    if commit.is_empty() {
        None
    } else {
        Some(commit.to_string())
    }
}
