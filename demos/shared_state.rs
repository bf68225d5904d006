//! Shared state aggregation example
//!
//! Demonstrates several producers feeding one queue, consumers aggregating
//! into shared state, and error isolation in the consume callback.
//!
//! Run with: cargo run --example shared_state

use queue_processor::prelude::*;
use rand::Rng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const EVENTS_PER_SOURCE: usize = 25;

fn main() -> Result<()> {
    env_logger::init();

    println!("=== Queue Processor - Shared State Example ===\n");

    // Each producer is one event source; consumers tally events per level
    let emitted = Arc::new(AtomicUsize::new(0));
    let tally: Arc<Mutex<HashMap<String, u64>>> = Arc::new(Mutex::new(HashMap::new()));
    let tally_clone = Arc::clone(&tally);

    let handler = ClosureHandler::with_name(
        move |producer_id| {
            let seq = emitted.fetch_add(1, Ordering::SeqCst);
            if seq >= EVENTS_PER_SOURCE * 2 {
                return Ok(None);
            }

            let level = match seq % 10 {
                0 => "error",
                1..=3 => "warn",
                _ => "info",
            };

            let mut item = Item::new();
            item.insert("source", format!("sensor-{}", producer_id));
            item.insert("seq", seq as u64);
            item.insert("reading", rand::thread_rng().gen_range(0.0..100.0));
            // Every 13th event is malformed so the consumers have
            // something to reject
            if seq % 13 != 0 {
                item.insert("level", level);
            }
            Ok(Some(vec![item]))
        },
        move |_consumer_id, item| {
            let level = item
                .get("level")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ProcessorError::other("event without a level"))?;

            let mut tally = tally_clone.lock().unwrap();
            *tally.entry(level.to_string()).or_insert(0) += 1;
            Ok(())
        },
        "event-aggregator",
    );

    let config = ProcessorConfig::default()
        .with_producer_count(2)
        .with_consumer_count(4);
    let processor = QueueProcessor::with_config(config, handler)?;

    println!("1. Starting 2 event sources and 4 aggregating consumers");
    processor.start_all()?;

    println!(
        "\n2. Waiting for all {} events (a few malformed) to flow through",
        EVENTS_PER_SOURCE * 2
    );
    processor.join_producers()?;
    processor.stop_consumers()?;
    processor.join_consumers()?;

    println!("\n3. Aggregated counts:");
    let tally = tally.lock().unwrap();
    let mut levels: Vec<_> = tally.iter().collect();
    levels.sort();
    for (level, count) in levels {
        println!("   {:>5}: {}", level, count);
    }

    println!("\n4. Flow statistics:");
    println!("   Produced: {}", processor.total_items_produced());
    println!("   Consumed: {}", processor.total_items_consumed());
    println!("   Failures: {}", processor.total_consume_failures());

    let consumed_by_each: Vec<u64> = processor
        .consumer_stats()
        .iter()
        .map(|s| s.get_items_consumed())
        .collect();
    println!("   Per-consumer split: {:?}", consumed_by_each);

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
