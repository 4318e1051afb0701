/// Which multipart field an uploaded image arrived in. Each kind is stored
/// in its own directory under the storage root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Profile,
    Background,
}

impl ImageKind {
    pub fn from_field(name: &str) -> Option<Self> {
        match name {
            "profile" => Some(ImageKind::Profile),
            "background" => Some(ImageKind::Background),
            _ => None,
        }
    }

    pub fn field_name(&self) -> &'static str {
        match self {
            ImageKind::Profile => "profile",
            ImageKind::Background => "background",
        }
    }

    pub fn dir(&self) -> &'static str {
        match self {
            ImageKind::Profile => "profiles",
            ImageKind::Background => "backgrounds",
        }
    }
}

impl std::fmt::Display for ImageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field_name())
    }
}

/// SECURITY: check the leading bytes so only real images end up on disk
pub fn validate_image_magic_bytes(data: &[u8]) -> bool {
    if data.len() < 4 {
        return false;
    }
    // PNG
    if data.starts_with(&[0x89, b'P', b'N', b'G']) {
        return true;
    }
    // JPEG
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return true;
    }
    // GIF87a / GIF89a
    if data.starts_with(b"GIF8") {
        return true;
    }
    // WebP (RIFF....WEBP)
    if data.starts_with(b"RIFF") && data.len() >= 12 && &data[8..12] == b"WEBP" {
        return true;
    }
    // BMP
    if data.starts_with(b"BM") {
        return true;
    }
    false
}
