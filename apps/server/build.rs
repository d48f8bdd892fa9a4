use dotenvy::dotenv;

// Forward anything in .env to the compiled binary's environment.
fn main() {
    dotenv().ok();

    for (key, value) in std::env::vars() {
        println!("cargo:rustc-env={key}={value}");
    }
}
