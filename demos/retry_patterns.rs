//! Retry Patterns Example
//!
//! Demonstrates bounded retry for blocking and async operations.
//! Shows practical patterns including:
//! - Basic retry with a fixed delay
//! - Comparing backoff strategies
//! - Conditional retry on io::ErrorKind
//! - Observability hooks and tracing output
//! - Async retry on the tokio clock

use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use steadfast::fallback::swallow;
use steadfast::{
    retry, retry_async, retry_if, retry_with_hooks, AnyFailure, Backoff, KindSet, RetryEvent,
    RetryPolicy,
};

// ==================== Basic Retry ====================

/// Example 1: an operation that fails twice, then succeeds.
fn example_basic_retry() -> Result<(), steadfast::PolicyError> {
    println!("\n=== Example 1: Basic Retry ===");

    let policy = RetryPolicy::new(3, Duration::from_millis(50))?;
    let mut attempt = 0;

    let result = retry(&policy, || {
        attempt += 1;
        println!("  Attempt {}", attempt);
        if attempt < 3 {
            Err("transient failure")
        } else {
            Ok(42)
        }
    });

    println!("Result: {:?}", result);
    Ok(())
}

// ==================== Backoff Strategies ====================

/// Example 2: how delays grow with each strategy.
fn example_backoff_strategies() -> Result<(), steadfast::PolicyError> {
    println!("\n=== Example 2: Backoff Strategies ===");

    for backoff in [Backoff::Fixed, Backoff::Linear, Backoff::Exponential] {
        let policy = RetryPolicy::new(6, Duration::from_millis(100))?.with_backoff(backoff);
        let delays: Vec<_> = (1..policy.max_attempts())
            .filter_map(|attempt| policy.delay_after(attempt))
            .collect();
        println!("{:>12}: {:?}", backoff.as_str(), delays);
    }
    Ok(())
}

// ==================== Conditional Retry ====================

/// Example 3: retry timeouts, fail fast on everything else.
fn example_conditional_retry() -> Result<(), steadfast::PolicyError> {
    println!("\n=== Example 3: Conditional Retry ===");

    let policy = RetryPolicy::new(5, Duration::from_millis(10))?;
    let transient: KindSet<io::ErrorKind> =
        [io::ErrorKind::TimedOut, io::ErrorKind::Interrupted]
            .into_iter()
            .collect();
    let mut attempt = 0;

    let result: Result<(), io::Error> = retry_if(
        &policy,
        || {
            attempt += 1;
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only mount"))
        },
        transient,
    );

    println!("Failed after {} attempt(s): {:?}", attempt, result);
    Ok(())
}

// ==================== Hooks ====================

/// Example 4: observe every failed attempt.
fn example_hooks() -> Result<(), steadfast::PolicyError> {
    println!("\n=== Example 4: Hooks ===");

    let policy = RetryPolicy::new(4, Duration::from_millis(10))?.with_backoff(Backoff::Linear);

    let _ = retry_with_hooks(
        &policy,
        || Err::<(), _>("connection refused"),
        AnyFailure,
        |event: &RetryEvent<'_, &str>| {
            tracing::info!(
                attempt = event.attempt,
                error = *event.error,
                next_delay = ?event.next_delay,
                "attempt failed"
            );
        },
    );

    let port: u16 = swallow(|| "eighty".parse::<u16>(), 80);
    println!("Falling back to port {}", port);
    Ok(())
}

// ==================== Async ====================

/// Example 5: async retry on the tokio clock.
async fn example_async_retry() -> Result<(), steadfast::PolicyError> {
    println!("\n=== Example 5: Async Retry ===");

    let policy = RetryPolicy::new(3, Duration::from_millis(50))?.with_backoff(Backoff::Exponential);
    let attempts = Arc::new(AtomicU32::new(0));

    let result = retry_async(&policy, || {
        let attempts = attempts.clone();
        async move {
            let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            println!("  Async attempt {}", n);
            if n < 2 {
                Err("service warming up")
            } else {
                Ok("ready")
            }
        }
    })
    .await;

    println!("Result: {:?}", result);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), steadfast::PolicyError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    example_basic_retry()?;
    example_backoff_strategies()?;
    example_conditional_retry()?;
    example_hooks()?;
    example_async_retry().await?;

    Ok(())
}
