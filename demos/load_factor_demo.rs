use clap::Parser;
use twin_hash::ProbedTable;
use twin_hash::hash;

#[derive(Parser, Debug)]
struct Args {
    /// How many entries to push through the table.
    #[arg(short = 'n', long = "entries", default_value_t = 1000)]
    entries: usize,
}

fn report<H, C>(stage: &str, table: &ProbedTable<u64, u64, H, C>) {
    println!(
        "{stage:<24} len {:>6}  capacity {:>6}  load factor {:>5.1}%",
        table.len(),
        table.capacity(),
        table.load_factor() * 100.0
    );
}

fn main() {
    let args = Args::parse();

    println!("Inserting {} entries into an empty table", args.entries);

    let mut table = ProbedTable::new(0, hash::folded, u64::cmp);
    report("empty", &table);

    let mut capacity = table.capacity();
    for key in 0..args.entries as u64 {
        table.insert(key, key * key);
        if table.capacity() != capacity {
            capacity = table.capacity();
            println!("  grew to {:>6} slots at {:>6} entries", capacity, table.len());
        }
    }
    report("after inserts", &table);

    println!("Removing every even key");
    for key in (0..args.entries as u64).step_by(2) {
        table.remove(&key);
        if table.capacity() != capacity {
            capacity = table.capacity();
            println!("  shrank to {:>6} slots at {:>6} entries", capacity, table.len());
        }
    }
    report("after partial removal", &table);

    if args.entries > 1 {
        // Odd keys survived the removal pass and must still be reachable
        // through whatever tombstones it left behind.
        assert_eq!(table.get(&1), Some(&1));
    }

    println!("Draining the remaining keys");
    for key in (1..args.entries as u64).step_by(2) {
        table.remove(&key);
        if table.capacity() != capacity {
            capacity = table.capacity();
            println!("  shrank to {:>6} slots at {:>6} entries", capacity, table.len());
        }
    }
    report("after drain", &table);

    table.clear();
    report("after clear", &table);
}
