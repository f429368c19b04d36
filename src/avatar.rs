use gloo::console;
use web_sys::File;

/// Read the selected file and run it through the ingestion pipeline. The
/// pipeline itself cannot fail; only the platform file read can.
pub(crate) async fn ingest_file(file: File) -> Result<String, String> {
    let mime = file.type_();
    let bytes = read_file_bytes(file).await?;
    let outcome = studentkort_image_pipeline::ingest(&bytes, &mime);
    if let Some(err) = outcome.degraded.as_ref() {
        console::warn!("avatar ingest degraded to original bytes", err.to_string());
    }
    Ok(outcome.data_url)
}

async fn read_file_bytes(file: File) -> Result<Vec<u8>, String> {
    let buffer = wasm_bindgen_futures::JsFuture::from(file.array_buffer())
        .await
        .map_err(|_| "failed to read file".to_string())?;
    let array = js_sys::Uint8Array::new(&buffer);
    Ok(array.to_vec())
}
