use anyhow::Context;
use radix_hd::{
    AddressIndex, GenericPath, Language, MasterSeed, Mnemonic, RadixPath, RadixPathParams,
    Strength,
};
use std::str::FromStr;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Example 1: Generate a mnemonic and derive the first Radix account key
    println!("Example 1: Generate new mnemonic and Radix account");
    println!("--------------------------------------------------");

    let mnemonic = Mnemonic::generate(Strength::Words24, Language::English);
    println!("Mnemonic: {}", mnemonic);

    let master_node = MasterSeed::from_mnemonic(&mnemonic, "")
        .master_node()
        .context("Failed to create master node")?;

    let path = RadixPath::create(RadixPathParams::default())
        .context("Failed to build Radix path")?;
    let account = master_node
        .derive(&path)
        .context("Failed to derive account key")?;

    println!("Derivation Path: {}", path);
    println!("Public Key: {}", hex::encode(account.public_key()));
    println!("Extended Private Key: {}", account.to_xpriv());
    println!("Extended Public Key: {}", account.to_xpub());
    info!(%path, "derived first Radix account");

    // Example 2: Import a mnemonic and walk a few addresses of a second account
    println!("\nExample 2: Import mnemonic and list addresses");
    println!("---------------------------------------------");

    let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
    let mnemonic = Mnemonic::from_english_phrase(phrase).context("Failed to import mnemonic")?;
    let master_node = mnemonic
        .to_seed("passphrase")
        .master_node()
        .context("Failed to create master node")?;

    let mut path = RadixPath::create(RadixPathParams {
        account: 1,
        address: AddressIndex::new(0),
        ..Default::default()
    })?;
    for _ in 0..3 {
        let node = master_node.derive(&path)?;
        println!("{}: {}", path, hex::encode(node.public_key()));
        path = path.next_address()?;
    }

    // Example 3: Any BIP-32 path can be derived, but only Radix paths pass validation
    println!("\nExample 3: Generic BIP-32 path");
    println!("------------------------------");

    let generic = GenericPath::from_str("m/44'/60'/0'/0/0").context("Failed to parse path")?;
    let node = master_node.derive(&generic)?;
    println!("{}: {}", generic, hex::encode(node.public_key()));
    if let Err(err) = RadixPath::from_str(&generic.to_string()) {
        println!("Not a Radix path: {}", err);
    }

    Ok(())
}
