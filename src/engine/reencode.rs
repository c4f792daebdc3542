//! Re-encoding fallback splitter using the libav bindings
//!
//! Used when the ffmpeg CLI is unavailable or stream copy is ruled out. Each
//! segment is fully decoded, the temporal sub-range extracted, and the result
//! encoded with a fixed codec pair (H.264 video, AAC audio). Slower than
//! stream copy and quality-altering, which callers surface as a caveat.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ffmpeg_next as ffmpeg;
use ffmpeg_next::codec::{self, Id};
use tracing::{debug, info};

use crate::engine::{SplitStrategy, StrategyKind};
use crate::error::{SegmentError, SplitXError, SplitXResult};
use crate::planner::SegmentSpec;

/// Re-encode splitter with a fixed video/audio codec pair
pub struct ReencodeSplitter {
    video_codec: Id,
    audio_codec: Id,
}

impl ReencodeSplitter {
    /// Create a splitter encoding H.264 video and AAC audio.
    pub fn new() -> SplitXResult<Self> {
        ffmpeg::init().map_err(|e| SplitXError::FFmpegInitError {
            message: e.to_string(),
        })?;

        Ok(Self {
            video_codec: Id::H264,
            audio_codec: Id::AAC,
        })
    }
}

#[async_trait]
impl SplitStrategy for ReencodeSplitter {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Reencode
    }

    async fn split_segment(
        &self,
        input: &Path,
        spec: &SegmentSpec,
        output: &Path,
    ) -> Result<(), SegmentError> {
        debug!(
            "Re-encoding segment {} ({:.3}s + {:.3}s)",
            spec.index, spec.start, spec.duration
        );

        // The libav pipeline is blocking; keep it off the async runtime.
        let input = input.to_path_buf();
        let output = output.to_path_buf();
        let spec = spec.clone();
        let video_codec = self.video_codec;
        let audio_codec = self.audio_codec;

        tokio::task::spawn_blocking(move || {
            encode_segment(&input, &spec, &output, video_codec, audio_codec)
        })
        .await
        .map_err(|e| SegmentError::Encode {
            message: format!("encoder task panicked: {}", e),
        })?
    }
}

/// Decode the sub-range `[spec.start, spec.start + spec.duration)` of `input`
/// and encode it into `output` with the given codec pair. Timestamps are
/// rebased so the segment starts at zero.
fn encode_segment(
    input: &PathBuf,
    spec: &SegmentSpec,
    output: &PathBuf,
    video_codec: Id,
    audio_codec: Id,
) -> Result<(), SegmentError> {
    let fail = |message: String| SegmentError::Encode { message };

    let mut ictx = ffmpeg::format::input(input)
        .map_err(|e| fail(format!("failed to open input: {}", e)))?;

    let video_stream_index = ictx
        .streams()
        .best(ffmpeg::media::Type::Video)
        .map(|s| s.index())
        .ok_or_else(|| fail("no video stream found".to_string()))?;
    let audio_stream_index = ictx
        .streams()
        .best(ffmpeg::media::Type::Audio)
        .map(|s| s.index());

    let mut octx = ffmpeg::format::output(output)
        .map_err(|e| fail(format!("failed to create output: {}", e)))?;

    // Video decoder from the input stream parameters
    let video_params = ictx
        .stream(video_stream_index)
        .ok_or_else(|| fail("video stream not accessible".to_string()))?
        .parameters();
    let mut video_decoder = codec::context::Context::from_parameters(video_params)
        .map_err(|e| fail(format!("failed to create decoder context: {}", e)))?
        .decoder()
        .video()
        .map_err(|e| fail(format!("failed to create video decoder: {}", e)))?;

    // Video encoder with the fixed codec
    let video_encoder_codec = codec::encoder::find(video_codec)
        .ok_or_else(|| fail(format!("no encoder available for {:?}", video_codec)))?;
    let mut video_ost = octx
        .add_stream(video_encoder_codec)
        .map_err(|e| fail(format!("failed to add video stream: {}", e)))?;
    let video_out_index = video_ost.index();

    let mut video_encoder_ctx = codec::context::Context::new()
        .encoder()
        .video()
        .map_err(|e| fail(format!("failed to create video encoder: {}", e)))?;
    video_encoder_ctx.set_width(video_decoder.width());
    video_encoder_ctx.set_height(video_decoder.height());
    video_encoder_ctx.set_aspect_ratio(video_decoder.aspect_ratio());
    video_encoder_ctx.set_format(ffmpeg::format::Pixel::YUV420P);
    video_encoder_ctx.set_time_base(video_ost.time_base());
    let mut video_encoder = video_encoder_ctx
        .open_as(video_encoder_codec)
        .map_err(|e| fail(format!("failed to open video encoder: {}", e)))?;
    video_ost.set_parameters(&video_encoder);

    // Audio decoder/encoder pair for the first audio stream, if any
    let mut audio = match audio_stream_index {
        Some(index) => {
            let params = ictx
                .stream(index)
                .ok_or_else(|| fail("audio stream not accessible".to_string()))?
                .parameters();
            let decoder = codec::context::Context::from_parameters(params)
                .map_err(|e| fail(format!("failed to create audio decoder context: {}", e)))?
                .decoder()
                .audio()
                .map_err(|e| fail(format!("failed to create audio decoder: {}", e)))?;

            let encoder_codec = codec::encoder::find(audio_codec)
                .ok_or_else(|| fail(format!("no encoder available for {:?}", audio_codec)))?;
            let mut audio_ost = octx
                .add_stream(encoder_codec)
                .map_err(|e| fail(format!("failed to add audio stream: {}", e)))?;
            let out_index = audio_ost.index();

            let mut encoder_ctx = codec::context::Context::new()
                .encoder()
                .audio()
                .map_err(|e| fail(format!("failed to create audio encoder: {}", e)))?;
            encoder_ctx.set_rate(decoder.rate() as i32);
            encoder_ctx.set_channel_layout(decoder.channel_layout());
            encoder_ctx.set_format(decoder.format());
            encoder_ctx.set_time_base((1, decoder.rate() as i32));
            let encoder = encoder_ctx
                .open_as(encoder_codec)
                .map_err(|e| fail(format!("failed to open audio encoder: {}", e)))?;
            audio_ost.set_parameters(&encoder);

            Some((index, out_index, decoder, encoder))
        }
        None => None,
    };

    octx.write_header()
        .map_err(|e| fail(format!("failed to write header: {}", e)))?;

    let av_time_base = ffmpeg::ffi::AV_TIME_BASE as f64;
    let start_ts = (spec.start * av_time_base) as i64;
    let end_ts = ((spec.start + spec.duration) * av_time_base) as i64;

    if spec.start > 0.0 {
        ictx.seek(start_ts, ..start_ts)
            .map_err(|e| fail(format!("failed to seek: {}", e)))?;
    }

    let stream_timebases: Vec<ffmpeg::Rational> = ictx.streams().map(|s| s.time_base()).collect();
    let mut frames_processed: u64 = 0;

    for (stream, packet) in ictx.packets() {
        let index = stream.index();
        let pts = match packet.pts() {
            Some(pts) => pts,
            None => continue,
        };

        let tb = stream_timebases[index];
        let pts_av = (pts as f64 * tb.numerator() as f64 / tb.denominator() as f64 * av_time_base)
            as i64;

        if pts_av < start_ts {
            continue;
        }
        if pts_av > end_ts {
            break;
        }

        // Rebase against the segment start so output timestamps begin at zero
        let rebased = |ts_av: i64, out_tb: ffmpeg::Rational| -> i64 {
            ((ts_av - start_ts) as f64 / av_time_base * out_tb.denominator() as f64
                / out_tb.numerator() as f64) as i64
        };

        if index == video_stream_index {
            video_decoder
                .send_packet(&packet)
                .map_err(|e| fail(format!("failed to send packet to decoder: {}", e)))?;

            let mut frame = ffmpeg::util::frame::video::Video::empty();
            while video_decoder.receive_frame(&mut frame).is_ok() {
                video_encoder
                    .send_frame(&frame)
                    .map_err(|e| fail(format!("failed to send frame to encoder: {}", e)))?;

                let mut encoded = codec::packet::Packet::empty();
                while video_encoder.receive_packet(&mut encoded).is_ok() {
                    encoded.set_stream(video_out_index);
                    let ts = rebased(pts_av, stream_timebases[video_stream_index]);
                    encoded.set_pts(Some(ts));
                    encoded.set_dts(Some(ts));
                    encoded
                        .write_interleaved(&mut octx)
                        .map_err(|e| fail(format!("failed to write video packet: {}", e)))?;
                    frames_processed += 1;
                }
            }
        } else if let Some((audio_index, audio_out_index, decoder, encoder)) = audio.as_mut() {
            if index == *audio_index {
                decoder
                    .send_packet(&packet)
                    .map_err(|e| fail(format!("failed to send packet to audio decoder: {}", e)))?;

                let mut frame = ffmpeg::util::frame::audio::Audio::empty();
                while decoder.receive_frame(&mut frame).is_ok() {
                    encoder
                        .send_frame(&frame)
                        .map_err(|e| fail(format!("failed to send frame to audio encoder: {}", e)))?;

                    let mut encoded = codec::packet::Packet::empty();
                    while encoder.receive_packet(&mut encoded).is_ok() {
                        encoded.set_stream(*audio_out_index);
                        let ts = rebased(pts_av, stream_timebases[*audio_index]);
                        encoded.set_pts(Some(ts));
                        encoded.set_dts(Some(ts));
                        encoded
                            .write_interleaved(&mut octx)
                            .map_err(|e| fail(format!("failed to write audio packet: {}", e)))?;
                    }
                }
            }
        }
    }

    // Flush the encoders
    video_encoder
        .send_eof()
        .map_err(|e| fail(format!("failed to flush video encoder: {}", e)))?;
    let mut encoded = codec::packet::Packet::empty();
    while video_encoder.receive_packet(&mut encoded).is_ok() {
        encoded.set_stream(video_out_index);
        encoded
            .write_interleaved(&mut octx)
            .map_err(|e| fail(format!("failed to write final video packet: {}", e)))?;
    }

    if let Some((_, audio_out_index, _, encoder)) = audio.as_mut() {
        encoder
            .send_eof()
            .map_err(|e| fail(format!("failed to flush audio encoder: {}", e)))?;
        let mut encoded = codec::packet::Packet::empty();
        while encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(*audio_out_index);
            encoded
                .write_interleaved(&mut octx)
                .map_err(|e| fail(format!("failed to write final audio packet: {}", e)))?;
        }
    }

    octx.write_trailer()
        .map_err(|e| fail(format!("failed to write trailer: {}", e)))?;

    info!(
        "Re-encoded segment {}: {} video frames written",
        spec.index, frames_processed
    );
    Ok(())
}
