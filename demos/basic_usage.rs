//! Basic queue processor usage example
//!
//! Demonstrates processor creation, the produce/consume callbacks, and
//! statistics tracking.
//!
//! Run with: cargo run --example basic_usage

use queue_processor::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    env_logger::init();

    println!("=== Queue Processor - Basic Usage Example ===\n");

    // A small backlog of file names to pretend-process
    let backlog: Vec<Item> = (1..=10)
        .map(|i| {
            let mut item = Item::new();
            item.insert("file", format!("photo-{:02}.png", i));
            item.insert("size_kb", (i * 120) as u64);
            item
        })
        .collect();

    let backlog = Mutex::new(backlog);
    let processed_kb = Arc::new(AtomicUsize::new(0));
    let processed_kb_clone = Arc::clone(&processed_kb);

    let handler = ClosureHandler::with_name(
        move |producer_id| {
            // Hand out one item per poll until the backlog runs dry
            match backlog.lock().unwrap().pop() {
                Some(item) => {
                    println!(
                        "  producer {} queued {:?}",
                        producer_id,
                        item.get("file").and_then(|v| v.as_str()).unwrap_or("?")
                    );
                    Ok(Some(vec![item]))
                }
                None => Ok(None),
            }
        },
        move |consumer_id, item| {
            let file = item.get("file").and_then(|v| v.as_str()).unwrap_or("?");
            let size = item.get("size_kb").and_then(|v| v.as_u64()).unwrap_or(0);
            println!(
                "  consumer {} processing {} ({} KB) on thread {:?}",
                consumer_id,
                file,
                size,
                thread::current().id()
            );
            thread::sleep(Duration::from_millis(20));
            processed_kb_clone.fetch_add(size as usize, Ordering::Relaxed);
            Ok(())
        },
        "photo-resizer",
    );

    let config = ProcessorConfig::default()
        .with_capacity(4)
        .with_producer_count(1)
        .with_consumer_count(3);

    let processor = QueueProcessor::with_config(config, handler)?;

    println!(
        "1. Starting '{}' with {} producer and {} consumers",
        processor.handler().name(),
        processor.config().producer_count,
        processor.config().consumer_count
    );
    processor.start_all()?;

    println!("\n2. Letting the backlog drain:");

    // The producer halts on its own when the backlog is empty
    processor.join_producers()?;
    println!("   All producers finished");

    // Consumers need one sentinel each to stop
    processor.stop_consumers()?;
    processor.join_consumers()?;
    println!("   All consumers finished");

    println!("\n3. Statistics:");
    println!("   Total items produced: {}", processor.total_items_produced());
    println!("   Total items consumed: {}", processor.total_items_consumed());
    println!(
        "   Total data processed: {} KB",
        processed_kb.load(Ordering::Relaxed)
    );

    println!("\n4. Per-consumer statistics:");
    for (i, stats) in processor.consumer_stats().iter().enumerate() {
        println!(
            "   Consumer {}: {} consumed, {} failed, {} panicked",
            i,
            stats.get_items_consumed(),
            stats.get_consume_failures(),
            stats.get_consume_panics()
        );
    }

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
