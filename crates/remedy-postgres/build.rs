#![forbid(unsafe_code)]

// `embed_migrations!` does not track the files it embeds.
fn main() {
    println!("cargo:rerun-if-changed=./migrations");
}
