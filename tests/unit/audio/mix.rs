use super::*;

fn mono(rate: u32, samples: Vec<f32>) -> AudioPcm {
    AudioPcm {
        sample_rate: rate,
        channels: 1,
        interleaved_f32: samples,
    }
}

#[test]
fn merge_spans_longer_track_and_attenuates_background() {
    // 4 s foreground over 6 s background (rate 10 Hz keeps the buffers tiny).
    let fg = mono(10, vec![0.5; 40]);
    let bg = mono(10, vec![1.0; 60]);
    let merged = overlay_merge(&fg, &bg, -20.0).unwrap();

    assert_eq!(merged.frames(), 60);
    assert!((merged.duration_sec() - 6.0).abs() < 1e-12);
    assert!((merged.interleaved_f32[0] - 0.6).abs() < 1e-5);
    assert!((merged.interleaved_f32[59] - 0.1).abs() < 1e-5);
}

#[test]
fn merge_pads_background_when_foreground_is_longer() {
    let fg = mono(10, vec![0.25; 60]);
    let bg = mono(10, vec![0.5; 40]);
    let merged = overlay_merge(&fg, &bg, 0.0).unwrap();
    assert_eq!(merged.frames(), 60);
    assert!((merged.interleaved_f32[10] - 0.75).abs() < 1e-6);
    assert!((merged.interleaved_f32[50] - 0.25).abs() < 1e-6);
}

#[test]
fn merge_clamps_and_rejects_mismatched_formats() {
    let loud = mono(10, vec![0.9; 5]);
    let merged = overlay_merge(&loud, &loud, 0.0).unwrap();
    assert!(merged.interleaved_f32.iter().all(|&s| s == 1.0));

    let other_rate = mono(20, vec![0.0; 5]);
    assert!(matches!(
        overlay_merge(&loud, &other_rate, 0.0),
        Err(PipelineError::Validation(_))
    ));
}

#[test]
fn speed_change_scales_length() {
    let pcm = AudioPcm {
        sample_rate: 100,
        channels: 2,
        interleaved_f32: (0..400).map(|i| (i / 2) as f32 / 200.0).collect(),
    };
    let fast = change_speed(&pcm, 2.0).unwrap();
    assert_eq!(fast.frames(), 100);
    assert_eq!(fast.channels, 2);
    // Frame i of the sped-up output is source frame 2i.
    assert!((fast.interleaved_f32[20] - 20.0 / 200.0).abs() < 1e-6);

    let slow = change_speed(&pcm, 0.5).unwrap();
    assert_eq!(slow.frames(), 400);
    // Halfway between source frames 0 and 1.
    assert!((slow.interleaved_f32[2] - 0.5 / 200.0).abs() < 1e-6);

    assert_eq!(change_speed(&pcm, 1.0).unwrap(), pcm);
    assert!(change_speed(&pcm, 0.0).is_err());
}

#[test]
fn f32le_file_round_trips_bytes() {
    let path = std::env::temp_dir().join(format!("wavecast_mix_{}.f32le", std::process::id()));
    write_pcm_to_f32le_file(&[0.25, -0.5], &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 8);
    assert_eq!(f32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), -0.5);
    std::fs::remove_file(&path).unwrap();
}
