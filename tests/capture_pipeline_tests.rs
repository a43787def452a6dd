// Integration tests for the capture subprocess pipeline
//
// Stand-in processes play the role of the capture tool so the drain loop
// and the hard-kill stop can be checked without a screen.

#![cfg(unix)]

use anyhow::Result;
use std::time::Duration;
use zoomreel::capture::{CaptureCommand, CaptureProcess};
use zoomreel::SessionError;

fn shell(script: &str) -> CaptureCommand {
    CaptureCommand::new("sh", vec!["-c".to_string(), script.to_string()])
}

async fn wait_for_bytes(process: &CaptureProcess, expected: usize) {
    for _ in 0..500 {
        if process.bytes_captured() >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("drain never reached {} bytes", expected);
}

#[tokio::test]
async fn test_kill_keeps_partial_output() -> Result<()> {
    let process = CaptureProcess::spawn(&shell("printf abc; exec sleep 30"))?;
    wait_for_bytes(&process, 3).await;

    let artifact = tokio::time::timeout(Duration::from_secs(10), process.terminate()).await??;

    assert_eq!(artifact, b"abc");
    Ok(())
}

#[tokio::test]
async fn test_silent_process_gives_empty_artifact() -> Result<()> {
    let process = CaptureProcess::spawn(&CaptureCommand::new("sleep", vec!["30".to_string()]))?;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let artifact = tokio::time::timeout(Duration::from_secs(10), process.terminate()).await??;

    assert!(artifact.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_output_larger_than_one_chunk() -> Result<()> {
    // 10000 bytes spans several 4096-byte reads
    let process = CaptureProcess::spawn(&shell("head -c 10000 /dev/zero; exec sleep 30"))?;
    wait_for_bytes(&process, 10_000).await;

    let artifact = process.terminate().await?;

    assert_eq!(artifact.len(), 10_000);
    assert!(artifact.iter().all(|&b| b == 0));
    Ok(())
}

#[tokio::test]
async fn test_process_that_exits_on_its_own() -> Result<()> {
    let process = CaptureProcess::spawn(&shell("printf done"))?;
    wait_for_bytes(&process, 4).await;

    let artifact = process.terminate().await?;

    assert_eq!(artifact, b"done");
    Ok(())
}

#[tokio::test]
async fn test_missing_program_is_process_error() {
    let result = CaptureProcess::spawn(&CaptureCommand::new(
        "/nonexistent/capture-tool",
        Vec::new(),
    ));

    assert!(matches!(result, Err(SessionError::Process(_))));
}
