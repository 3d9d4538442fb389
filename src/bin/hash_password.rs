use clap::Parser;
use tokengate::infra_local::LocalIdentityProvider;

/// Prints an Argon2 PHC string for `provider.local.users[].password_hash`.
#[derive(Parser, Debug)]
struct Args {
    password: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let hash = LocalIdentityProvider::hash_password(&args.password)?;
    println!("{}", hash);
    Ok(())
}
