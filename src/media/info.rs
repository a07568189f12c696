use serde::Deserialize;
use crate::database::MediaColumns;

/// ffprobe の数値項目。文字列で来ることも数値で来ることもある
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ProbeValue {
    Number(f64),
    Text(String),
}

impl ProbeValue {
    /// 先頭の整数部分を取り出す（"123.4" → 123、"N/A" → None）
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ProbeValue::Number(n) if n.is_finite() => Some(n.trunc() as i64),
            ProbeValue::Number(_) => None,
            ProbeValue::Text(s) => parse_leading_int(s),
        }
    }
}

fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

fn int_of(value: &Option<ProbeValue>) -> Option<i64> {
    value.as_ref().and_then(ProbeValue::as_int)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeStream {
    pub codec_type: Option<String>,
    pub codec_name: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub duration: Option<ProbeValue>,
    pub bit_rate: Option<ProbeValue>,
    pub sample_rate: Option<ProbeValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeFormat {
    pub duration: Option<ProbeValue>,
}

/// `ffprobe -show_streams -show_format` の出力
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeOutput {
    #[serde(default)]
    pub streams: Vec<ProbeStream>,
    #[serde(default)]
    pub format: Option<ProbeFormat>,
}

impl ProbeOutput {
    fn first_stream(&self, codec_type: &str) -> Option<&ProbeStream> {
        self.streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some(codec_type))
    }

    /// DB に保存する列へ変換。
    /// 映像ストリームの長さが数値でなければコンテナの長さを使う
    pub fn to_columns(&self) -> MediaColumns {
        let empty = ProbeStream::default();
        let video = self.first_stream("video").unwrap_or(&empty);
        let audio = self.first_stream("audio").unwrap_or(&empty);

        let duration = int_of(&video.duration).or_else(|| {
            self.format
                .as_ref()
                .and_then(|f| int_of(&f.duration))
        });

        MediaColumns {
            width: video.width,
            height: video.height,
            duration,
            vcodec: video.codec_name.clone(),
            v_bit_rate: int_of(&video.bit_rate),
            acodec: audio.codec_name.clone(),
            a_bit_rate: int_of(&audio.bit_rate),
            sample_rate: int_of(&audio.sample_rate),
        }
    }
}
