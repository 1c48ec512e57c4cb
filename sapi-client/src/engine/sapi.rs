//! SAPI 5 engine over COM.
//!
//! One `ISpVoice` and one token category are created per process. COM is
//! entered apartment-threaded when the engine opens and left when it drops.

use std::path::Path;

use tracing::{debug, info};
use windows::core::{w, GUID, HSTRING, PCWSTR, PWSTR};
use windows::Win32::Foundation::BOOL;
use windows::Win32::Media::Audio::{WAVEFORMATEX, WAVE_FORMAT_PCM};
use windows::Win32::Media::Speech::{
    ISpObjectToken, ISpObjectTokenCategory, ISpStream, ISpStreamFormat, ISpVoice,
    SpObjectTokenCategory, SpStream, SpVoice, SPFM_CREATE_ALWAYS, SPF_DEFAULT, SPF_IS_XML,
    SPF_PARSE_SAPI, SPF_PARSE_SSML,
};
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoTaskMemFree, CoUninitialize, CLSCTX_ALL,
    COINIT_APARTMENTTHREADED,
};

use super::{SpeakFormat, SpeechEngine, VoiceToken, WaveFormat};
use crate::error::{EngineError, EngineResult};

/// `SPDFID_WaveFormatEx`: the stream format is described by a `WAVEFORMATEX`.
const SPDFID_WAVE_FORMAT_EX: GUID = GUID::from_u128(0xc31adbae_527f_4ff5_a230_f62bb61ff70c);

impl From<windows::core::Error> for EngineError {
    fn from(err: windows::core::Error) -> Self {
        EngineError::new(err.to_string())
    }
}

/// Keeps COM initialized on this thread.
struct Apartment;

impl Apartment {
    fn enter() -> EngineResult<Self> {
        unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) }.ok()?;
        Ok(Self)
    }
}

impl Drop for Apartment {
    fn drop(&mut self) {
        unsafe { CoUninitialize() };
    }
}

pub struct SapiEngine {
    voice: ISpVoice,
    category: ISpObjectTokenCategory,
    // Dropped last, after the COM objects above are released.
    _apartment: Apartment,
}

impl SapiEngine {
    /// Create the synthesizer and bind the voice catalog to `catalog`,
    /// a token category id such as
    /// `HKEY_LOCAL_MACHINE\SOFTWARE\Microsoft\Speech_OneCore\Voices`.
    pub fn open(catalog: &str) -> EngineResult<Self> {
        let apartment = Apartment::enter()?;
        let voice: ISpVoice = unsafe { CoCreateInstance(&SpVoice, None, CLSCTX_ALL) }?;
        let category: ISpObjectTokenCategory =
            unsafe { CoCreateInstance(&SpObjectTokenCategory, None, CLSCTX_ALL) }?;
        unsafe { category.SetId(&HSTRING::from(catalog), BOOL::from(false)) }?;
        info!("SAPI voice catalog: {catalog}");

        Ok(Self {
            voice,
            category,
            _apartment: apartment,
        })
    }
}

/// Copy a COM-allocated string and free it.
unsafe fn take_string(value: PWSTR) -> EngineResult<String> {
    let text = value.to_string();
    CoTaskMemFree(Some(value.0 as *const _));
    text.map_err(|e| EngineError::new(format!("token value is not valid UTF-16: {e}")))
}

fn read_token(token: ISpObjectToken) -> EngineResult<VoiceToken<ISpObjectToken>> {
    unsafe {
        let id = take_string(token.GetId()?)?;
        let attributes = token.OpenKey(w!("Attributes"))?;
        let name = take_string(attributes.GetStringValue(w!("Name"))?)?;
        // The description is the token's default value; some third-party
        // voices leave it unset.
        let description = match token.GetStringValue(PCWSTR::null()) {
            Ok(value) => take_string(value)?,
            Err(_) => name.clone(),
        };
        Ok(VoiceToken {
            name,
            description,
            id,
            handle: token,
        })
    }
}

fn speak_flags(format: SpeakFormat) -> u32 {
    let flags = match format {
        SpeakFormat::Auto => SPF_DEFAULT.0,
        SpeakFormat::SapiXml => SPF_IS_XML.0 | SPF_PARSE_SAPI.0,
        SpeakFormat::Ssml => SPF_IS_XML.0 | SPF_PARSE_SSML.0,
    };
    flags as u32
}

fn wave_format_ex(format: &WaveFormat) -> EngineResult<WAVEFORMATEX> {
    format.validate().map_err(EngineError::new)?;
    let (Some(block_align), Some(bytes_per_second)) =
        (format.block_align(), format.bytes_per_second())
    else {
        return Err(EngineError::new(format!("wave format overflows: {format:?}")));
    };
    Ok(WAVEFORMATEX {
        wFormatTag: WAVE_FORMAT_PCM as u16,
        nChannels: format.channels,
        nSamplesPerSec: format.sample_rate,
        nAvgBytesPerSec: bytes_per_second,
        nBlockAlign: block_align,
        wBitsPerSample: format.bits_per_sample,
        cbSize: 0,
    })
}

impl SpeechEngine for SapiEngine {
    type Voice = ISpObjectToken;
    type Output = ISpStreamFormat;
    type Sink = ISpStream;

    fn voices(&self) -> EngineResult<Vec<VoiceToken<ISpObjectToken>>> {
        let tokens = unsafe { self.category.EnumTokens(PCWSTR::null(), PCWSTR::null()) }?;
        let mut count = 0u32;
        unsafe { tokens.GetCount(&mut count) }?;
        debug!("Catalog holds {count} voice tokens");

        (0..count)
            .map(|index| read_token(unsafe { tokens.Item(index) }?))
            .collect()
    }

    fn voice(&self) -> EngineResult<ISpObjectToken> {
        Ok(unsafe { self.voice.GetVoice() }?)
    }

    fn set_voice(&self, voice: &ISpObjectToken) -> EngineResult<()> {
        Ok(unsafe { self.voice.SetVoice(voice) }?)
    }

    fn set_rate(&self, rate: i32) -> EngineResult<()> {
        Ok(unsafe { self.voice.SetRate(rate) }?)
    }

    fn output(&self) -> EngineResult<ISpStreamFormat> {
        Ok(unsafe { self.voice.GetOutputStream() }?)
    }

    fn redirect_output(&self, sink: &ISpStream) -> EngineResult<()> {
        Ok(unsafe { self.voice.SetOutput(sink, BOOL::from(true)) }?)
    }

    fn restore_output(&self, output: &ISpStreamFormat) -> EngineResult<()> {
        Ok(unsafe { self.voice.SetOutput(output, BOOL::from(true)) }?)
    }

    fn open_file_sink(&self, path: &Path, format: &WaveFormat) -> EngineResult<ISpStream> {
        let wave = wave_format_ex(format)?;
        let stream: ISpStream = unsafe { CoCreateInstance(&SpStream, None, CLSCTX_ALL) }?;
        unsafe {
            stream.BindToFile(
                &HSTRING::from(path.as_os_str()),
                SPFM_CREATE_ALWAYS,
                Some(&SPDFID_WAVE_FORMAT_EX as *const GUID),
                Some(&wave as *const WAVEFORMATEX),
                0,
            )
        }?;
        debug!("Opened WAV sink {} ({format:?})", path.display());
        Ok(stream)
    }

    fn close_sink(&self, sink: ISpStream) -> EngineResult<()> {
        Ok(unsafe { sink.Close() }?)
    }

    fn speak(&self, text: &str, format: SpeakFormat) -> EngineResult<()> {
        debug!("Speaking {} characters ({format:?})", text.chars().count());
        unsafe {
            self.voice
                .Speak(&HSTRING::from(text), speak_flags(format), None)
        }?;
        Ok(())
    }
}
