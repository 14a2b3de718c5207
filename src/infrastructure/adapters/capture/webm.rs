//! WebM Muxer - 最小的 EBML/WebM 写入
//!
//! 每次调用生成一个完整、可独立解码的 WebM 文件：
//! EBML Header + Segment(Info, Tracks, Cluster...)，只包含一条 Opus 音轨

// EBML Header
const EBML: u32 = 0x1A45_DFA3;
const EBML_VERSION: u32 = 0x4286;
const EBML_READ_VERSION: u32 = 0x42F7;
const EBML_MAX_ID_LENGTH: u32 = 0x42F2;
const EBML_MAX_SIZE_LENGTH: u32 = 0x42F3;
const DOC_TYPE: u32 = 0x4282;
const DOC_TYPE_VERSION: u32 = 0x4287;
const DOC_TYPE_READ_VERSION: u32 = 0x4285;

// Segment
const SEGMENT: u32 = 0x1853_8067;
const INFO: u32 = 0x1549_A966;
const TIMECODE_SCALE: u32 = 0x2A_D7B1;
const MUXING_APP: u32 = 0x4D80;
const WRITING_APP: u32 = 0x5741;
const DURATION: u32 = 0x4489;

// Tracks
const TRACKS: u32 = 0x1654_AE6B;
const TRACK_ENTRY: u32 = 0xAE;
const TRACK_NUMBER: u32 = 0xD7;
const TRACK_UID: u32 = 0x73C5;
const TRACK_TYPE: u32 = 0x83;
const CODEC_ID: u32 = 0x86;
const CODEC_PRIVATE: u32 = 0x63A2;
const CODEC_DELAY: u32 = 0x56AA;
const SEEK_PRE_ROLL: u32 = 0x56BB;
const AUDIO: u32 = 0xE1;
const SAMPLING_FREQUENCY: u32 = 0xB5;
const CHANNELS: u32 = 0x9F;

// Cluster
const CLUSTER: u32 = 0x1F43_B675;
const TIMECODE: u32 = 0xE7;
const SIMPLE_BLOCK: u32 = 0xA3;

const TRACK_TYPE_AUDIO: u64 = 2;
const OPUS_SAMPLE_RATE: u32 = 48_000;
/// 1ms
const TIMECODE_SCALE_NS: u64 = 1_000_000;
const SEEK_PRE_ROLL_NS: u64 = 80_000_000;
/// block 时间码是相对 cluster 的 i16，留足余量
const MAX_CLUSTER_SPAN_MS: u64 = 30_000;
const APP_NAME: &str = "roomqa";

pub fn write_ebml_id(buf: &mut Vec<u8>, id: u32) {
    // ID 自带长度标记位，直接写原始字节
    let bytes = id.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count().min(3);
    buf.extend_from_slice(&bytes[skip..]);
}

pub fn write_ebml_size(buf: &mut Vec<u8>, size: u64) {
    if size <= 0x7E {
        buf.push((size | 0x80) as u8);
    } else if size <= 0x3FFE {
        buf.push(((size >> 8) | 0x40) as u8);
        buf.push(size as u8);
    } else if size <= 0x1F_FFFE {
        buf.push(((size >> 16) | 0x20) as u8);
        buf.push((size >> 8) as u8);
        buf.push(size as u8);
    } else if size <= 0x0FFF_FFFE {
        buf.push(((size >> 24) | 0x10) as u8);
        buf.push((size >> 16) as u8);
        buf.push((size >> 8) as u8);
        buf.push(size as u8);
    } else {
        buf.push(0x01);
        buf.extend_from_slice(&size.to_be_bytes()[1..]);
    }
}

pub fn write_ebml_uint(buf: &mut Vec<u8>, id: u32, value: u64) {
    write_ebml_id(buf, id);
    let len = if value == 0 {
        1
    } else {
        ((64 - value.leading_zeros()) as usize + 7) / 8
    };
    write_ebml_size(buf, len as u64);
    buf.extend_from_slice(&value.to_be_bytes()[8 - len..]);
}

pub fn write_ebml_string(buf: &mut Vec<u8>, id: u32, value: &str) {
    write_ebml_binary(buf, id, value.as_bytes());
}

pub fn write_ebml_binary(buf: &mut Vec<u8>, id: u32, data: &[u8]) {
    write_ebml_id(buf, id);
    write_ebml_size(buf, data.len() as u64);
    buf.extend_from_slice(data);
}

pub fn write_ebml_float(buf: &mut Vec<u8>, id: u32, value: f64) {
    write_ebml_id(buf, id);
    write_ebml_size(buf, 8);
    buf.extend_from_slice(&value.to_be_bytes());
}

/// 已编码的 Opus 音轨
#[derive(Debug, Clone)]
pub struct OpusTrack<'a> {
    pub channels: u8,
    pub pre_skip: u16,
    /// 每个包的时长（毫秒）
    pub frame_ms: u64,
    pub packets: &'a [Vec<u8>],
}

/// Opus 标识头 (RFC 7845)，作为 CodecPrivate
pub fn opus_head(channels: u8, pre_skip: u16) -> Vec<u8> {
    let mut head = Vec::with_capacity(19);
    head.extend_from_slice(b"OpusHead");
    head.push(1);
    head.push(channels);
    head.extend_from_slice(&pre_skip.to_le_bytes());
    head.extend_from_slice(&OPUS_SAMPLE_RATE.to_le_bytes());
    head.extend_from_slice(&0i16.to_le_bytes());
    head.push(0);
    head
}

/// 封装成完整的 WebM 文件
pub fn mux_opus(track: &OpusTrack<'_>) -> Vec<u8> {
    let mut out = Vec::new();

    let mut header = Vec::new();
    write_ebml_uint(&mut header, EBML_VERSION, 1);
    write_ebml_uint(&mut header, EBML_READ_VERSION, 1);
    write_ebml_uint(&mut header, EBML_MAX_ID_LENGTH, 4);
    write_ebml_uint(&mut header, EBML_MAX_SIZE_LENGTH, 8);
    write_ebml_string(&mut header, DOC_TYPE, "webm");
    write_ebml_uint(&mut header, DOC_TYPE_VERSION, 4);
    write_ebml_uint(&mut header, DOC_TYPE_READ_VERSION, 2);
    write_ebml_binary(&mut out, EBML, &header);

    let mut segment = Vec::new();
    segment.extend(info_element(track));
    segment.extend(tracks_element(track));
    for cluster in clusters(track) {
        segment.extend(cluster);
    }
    write_ebml_binary(&mut out, SEGMENT, &segment);

    out
}

fn info_element(track: &OpusTrack<'_>) -> Vec<u8> {
    let duration_ms = track.packets.len() as u64 * track.frame_ms;

    let mut info = Vec::new();
    write_ebml_uint(&mut info, TIMECODE_SCALE, TIMECODE_SCALE_NS);
    write_ebml_string(&mut info, MUXING_APP, APP_NAME);
    write_ebml_string(&mut info, WRITING_APP, APP_NAME);
    write_ebml_float(&mut info, DURATION, duration_ms as f64);

    let mut out = Vec::new();
    write_ebml_binary(&mut out, INFO, &info);
    out
}

fn tracks_element(track: &OpusTrack<'_>) -> Vec<u8> {
    let codec_delay_ns = track.pre_skip as u64 * 1_000_000_000 / OPUS_SAMPLE_RATE as u64;

    let mut audio = Vec::new();
    write_ebml_float(&mut audio, SAMPLING_FREQUENCY, OPUS_SAMPLE_RATE as f64);
    write_ebml_uint(&mut audio, CHANNELS, track.channels as u64);

    let mut entry = Vec::new();
    write_ebml_uint(&mut entry, TRACK_NUMBER, 1);
    write_ebml_uint(&mut entry, TRACK_UID, 1);
    write_ebml_uint(&mut entry, TRACK_TYPE, TRACK_TYPE_AUDIO);
    write_ebml_string(&mut entry, CODEC_ID, "A_OPUS");
    write_ebml_binary(&mut entry, CODEC_PRIVATE, &opus_head(track.channels, track.pre_skip));
    write_ebml_uint(&mut entry, CODEC_DELAY, codec_delay_ns);
    write_ebml_uint(&mut entry, SEEK_PRE_ROLL, SEEK_PRE_ROLL_NS);
    write_ebml_binary(&mut entry, AUDIO, &audio);

    let mut tracks = Vec::new();
    write_ebml_binary(&mut tracks, TRACK_ENTRY, &entry);

    let mut out = Vec::new();
    write_ebml_binary(&mut out, TRACKS, &tracks);
    out
}

fn clusters(track: &OpusTrack<'_>) -> Vec<Vec<u8>> {
    let per_cluster = (MAX_CLUSTER_SPAN_MS / track.frame_ms.max(1)).max(1) as usize;

    track
        .packets
        .chunks(per_cluster)
        .enumerate()
        .map(|(cluster_idx, packets)| {
            let cluster_start_ms = (cluster_idx * per_cluster) as u64 * track.frame_ms;

            let mut body = Vec::new();
            write_ebml_uint(&mut body, TIMECODE, cluster_start_ms);

            for (i, packet) in packets.iter().enumerate() {
                let relative = (i as u64 * track.frame_ms) as i16;
                let mut block = Vec::with_capacity(packet.len() + 4);
                // track number 1 as vint
                block.push(0x81);
                block.extend_from_slice(&relative.to_be_bytes());
                // keyframe
                block.push(0x80);
                block.extend_from_slice(packet);
                write_ebml_binary(&mut body, SIMPLE_BLOCK, &block);
            }

            let mut out = Vec::new();
            write_ebml_binary(&mut out, CLUSTER, &body);
            out
        })
        .collect()
}
