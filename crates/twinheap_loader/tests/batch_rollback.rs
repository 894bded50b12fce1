//! Batch loading scenarios against real directories and both heaps.

use std::path::PathBuf;

use twinheap_core::{FrameAllocator, FrameError, HeapSide};
use twinheap_loader::{DirectorySource, LoadError, MemorySource, ObjectLoader};

struct AssetDir(PathBuf);

impl AssetDir {
    fn new(tag: &str, files: &[(&str, &[u8])]) -> Self {
        let root = std::env::temp_dir().join(format!("twinheap_{tag}_{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        for (name, bytes) in files {
            std::fs::write(root.join(name), bytes).unwrap();
        }
        Self(root)
    }
}

impl Drop for AssetDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

#[test]
fn level_loads_from_disk_and_unloads() {
    let assets = AssetDir::new(
        "level",
        &[("CopCar", &[0xC0; 100][..]), ("RobberCar", &[0x0B; 50][..])],
    );
    let loader = ObjectLoader::new(DirectorySource::new(&assets.0));
    let mut frames = FrameAllocator::new(1024, 16).unwrap();

    let level = frames.capture(HeapSide::Lower);
    let cars = loader
        .load_batch(&mut frames, HeapSide::Lower, &["CopCar", "RobberCar"])
        .unwrap();
    assert_eq!(cars[0].block.offset(), 0);
    assert_eq!(cars[1].block.offset(), 112);
    assert_eq!(frames.bytes(cars[1].block).unwrap(), &[0x0B; 50][..]);

    frames.release(level).unwrap();
    assert_eq!(frames.cursor(HeapSide::Lower), 0);
}

#[test]
fn empty_file_rolls_back_the_batch() {
    let assets = AssetDir::new("empty", &[("CopCar", &[1; 40][..]), ("Blank", &[][..])]);
    let loader = ObjectLoader::new(DirectorySource::new(&assets.0));
    let mut frames = FrameAllocator::new(1024, 16).unwrap();

    let err = loader
        .load_batch(&mut frames, HeapSide::Upper, &["CopCar", "Blank"])
        .unwrap_err();
    assert!(matches!(err, LoadError::EmptyObject(ref name) if name == "Blank"));
    assert_eq!(frames.cursor(HeapSide::Upper), 1024);
}

#[test]
fn out_of_memory_mid_batch_restores_both_heaps() {
    let source = MemorySource::new()
        .with("Terrain", vec![0; 300])
        .with("Skybox", vec![0; 300])
        .with("Music", vec![0; 300]);
    let loader = ObjectLoader::new(&source);
    let mut frames = FrameAllocator::new(1024, 16).unwrap();

    // Resident data on the other heap stays put.
    let resident = loader.load(&mut frames, HeapSide::Upper, "Music").unwrap();

    let err = loader
        .load_batch(&mut frames, HeapSide::Lower, &["Terrain", "Skybox", "Music"])
        .unwrap_err();
    assert!(matches!(
        err,
        LoadError::Frame(FrameError::OutOfMemory {
            heap: HeapSide::Lower,
            ..
        })
    ));
    assert_eq!(frames.cursor(HeapSide::Lower), 0);
    assert!(frames.is_live(resident.block));
    assert_eq!(frames.stats().upper_used, 304);
}

#[test]
fn batches_stack_on_the_same_heap() {
    let source = MemorySource::new().with("A", vec![1; 16]).with("B", vec![2; 16]);
    let loader = ObjectLoader::new(source);
    let mut frames = FrameAllocator::new(256, 16).unwrap();

    let first = loader.load_batch(&mut frames, HeapSide::Upper, &["A"]).unwrap();
    assert!(loader
        .load_batch(&mut frames, HeapSide::Upper, &["B", "missing"])
        .is_err());
    let second = loader.load_batch(&mut frames, HeapSide::Upper, &["B"]).unwrap();

    assert_eq!(first[0].block.offset(), 240);
    assert_eq!(second[0].block.offset(), 224);
    assert_eq!(loader.source().len(), 2);
}
