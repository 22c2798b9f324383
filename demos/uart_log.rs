// In demos/uart_log.rs
//
// Drives the trace queue over a simulated UART: a few worker threads log in
// bursts through the `log` facade, the UART worker thread plays the DMA
// complete interrupt, and overflow shows up as "Dropped messages" lines.
//
//   cargo run --example uart_log -- [bursts] [--slow]

use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::LevelFilter;
use uartq::{ModuleLevels, QueueBuilder, QueueLogger, SimulatedUart};

mod motor {
    pub fn step(burst: usize, n: usize) {
        log::debug!("burst {burst}: step {n} commutation ok");
        if n % 7 == 0 {
            log::info!("burst {burst}: position checkpoint {}", n * 100);
        }
    }
}

mod comms {
    pub fn poll(burst: usize) {
        // Filtered out: comms only logs errors.
        log::info!("burst {burst}: link idle");
        if burst % 3 == 0 {
            log::error!("burst {burst}: frame CRC mismatch");
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let bursts: usize = match args.get(1) {
        Some(arg) if !arg.starts_with("--") => arg.parse::<usize>()?,
        _ => 10,
    };
    let slow = args.iter().any(|a| a == "--slow");

    let mut uart = SimulatedUart::new().with_echo(true);
    if slow {
        uart = uart.with_line_delay(Duration::from_millis(2));
    }

    let (producer, queue) = QueueBuilder::new()
        .with_name("usart2")
        .build::<_, 32, 256>(uart.clone())?;

    let completion_queue = Arc::clone(&queue);
    let worker = uart.spawn_completion_worker(move || completion_queue.on_transmission_complete())?;

    let levels = ModuleLevels::new(LevelFilter::Warn)
        .with_module("uart_log::motor", LevelFilter::Debug)
        .with_module("uart_log::comms", LevelFilter::Error);
    QueueLogger::new(producer, levels).install()?;

    let running = Arc::new(AtomicBool::new(true));
    let running_for_handler = Arc::clone(&running);

    // Handle Ctrl+C to stop early
    ctrlc::set_handler(move || {
        running_for_handler.store(false, Ordering::SeqCst);
    })?;

    let threads: Vec<_> = (0..3)
        .map(|id| {
            let running = Arc::clone(&running);
            thread::spawn(move || {
                for burst in 0..bursts {
                    if !running.load(Ordering::SeqCst) {
                        break;
                    }
                    for n in 0..20 {
                        motor::step(burst * 10 + id, n);
                    }
                    comms::poll(burst);
                    thread::sleep(Duration::from_millis(5));
                }
            })
        })
        .collect();

    for t in threads {
        let _ = t.join();
    }

    // Let the channel drain, nudging it in case a start was deferred.
    while !queue.stats().is_quiescent() {
        let _ = queue.poll();
        thread::sleep(Duration::from_millis(1));
    }
    uart.shutdown();
    let _ = worker.join();

    let stats = queue.stats();
    eprintln!("\n--- usart2 trace queue ---");
    eprintln!("frames sent:        {}", uart.frames().len());
    eprintln!("completions:        {}", stats.completions);
    eprintln!("dropped (total):    {}", stats.total_dropped);
    eprintln!("drop notices:       {}", stats.notices_injected);
    eprintln!("submit failures:    {}", stats.submit_failures);
    Ok(())
}
