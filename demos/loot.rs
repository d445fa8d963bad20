use std::collections::HashMap;

use weighted_collection::{MutableWeightedCollection, WeightedEnum};

#[derive(Copy, Eq, PartialEq, Clone, Debug, Hash, WeightedEnum)]
enum Rarity {
    #[weight(1/1000)]
    Mythic,
    #[weight(1/100)]
    Legendary,
    #[weight(20/100)]
    Uncommon,
    #[weight(50/100)]
    Common,
}

fn print_hist<T: std::fmt::Debug>(hist: HashMap<T, u64>) {
    let mut values: Vec<(T, u64)> = hist.into_iter().collect();
    values.sort_by(|(_, ca), (_, cb)| cb.cmp(ca));
    for (item, count) in values {
        println!("{count: >7} {item:?}");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Build straight from the enum:
    let table = Rarity::collection()?;
    let mut rng = rand::rng();

    let mut hist: HashMap<Rarity, u64> = HashMap::default();
    for _ in 0..2_000_000 {
        *hist.entry(table.sample_owned(&mut rng)).or_default() += 1;
    }
    println!("Rarity:");
    print_hist(hist);

    // A shop whose stock shifts as items sell out:
    let mut shop = MutableWeightedCollection::from_unnormalized_int_weights([
        ("sword", 10),
        ("shield", 30),
        ("potion", 60),
    ])?;
    shop.set("potion", 0.0)?;
    shop.set("bow", 20.0)?;

    let mut hist: HashMap<&str, u64> = HashMap::default();
    for _ in 0..100_000 {
        *hist.entry(*shop.sample(&mut rng)).or_default() += 1;
    }
    println!("\nShop (potions sold out):");
    print_hist(hist);

    Ok(())
}
