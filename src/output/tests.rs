//! Tests for output module

use super::*;
use crate::engine::{Output, OutputSink};
use crate::error::Error;
use crate::types::OutputFormat;
use pretty_assertions::assert_eq;
use serde_json::json;

fn text(sink: WriterSink<Vec<u8>>) -> String {
    String::from_utf8(sink.into_inner()).unwrap()
}

#[tokio::test]
async fn test_json_lines_unrolls_arrays() {
    let mut sink = WriterSink::new(Vec::new(), OutputFormat::Json);

    sink.deliver(Output::page(0, json!([{"id": 1}, {"id": 2}])))
        .await
        .unwrap();
    sink.deliver(Output::page(1, json!([{"id": 3}])))
        .await
        .unwrap();

    assert_eq!(sink.written(), 3);
    assert_eq!(text(sink), "{\"id\":1}\n{\"id\":2}\n{\"id\":3}\n");
}

#[tokio::test]
async fn test_json_lines_without_unroll() {
    let mut sink = WriterSink::new(Vec::new(), OutputFormat::Json).with_unroll_arrays(false);

    sink.deliver(Output::page(0, json!([1, 2]))).await.unwrap();
    sink.deliver(Output::page(1, serde_json::Value::Null))
        .await
        .unwrap();

    assert_eq!(sink.written(), 2);
    assert_eq!(text(sink), "[1,2]\nnull\n");
}

#[tokio::test]
async fn test_null_and_empty_pages_write_nothing_when_unrolling() {
    let mut sink = WriterSink::new(Vec::new(), OutputFormat::Json);

    sink.deliver(Output::page(0, serde_json::Value::Null))
        .await
        .unwrap();
    sink.deliver(Output::page(1, json!([]))).await.unwrap();

    assert_eq!(sink.written(), 0);
    assert_eq!(text(sink), "");
}

#[tokio::test]
async fn test_pretty_format() {
    let mut sink = WriterSink::new(Vec::new(), OutputFormat::Pretty);

    sink.deliver(Output::page(0, json!({"ServiceName": "web"})))
        .await
        .unwrap();

    assert_eq!(text(sink), "{\n  \"ServiceName\": \"web\"\n}\n");
}

#[tokio::test]
async fn test_echo_is_written() {
    let mut sink = WriterSink::new(Vec::new(), OutputFormat::Json);
    sink.deliver(Output::echo(json!("REGIONAL"))).await.unwrap();
    assert_eq!(text(sink), "\"REGIONAL\"\n");
}

#[tokio::test]
async fn test_errors_are_kept_aside() {
    let mut sink = WriterSink::new(Vec::new(), OutputFormat::Json);

    sink.deliver(Output::page(0, json!([1]))).await.unwrap();
    sink.deliver(Output::Error(Error::Cancelled)).await.unwrap();

    assert!(sink.error().unwrap().is_cancelled());
    let err = sink.take_error().unwrap();
    assert!(err.is_cancelled());
    assert!(sink.error().is_none());
    assert_eq!(text(sink), "1\n");
}
