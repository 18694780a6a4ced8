use std::io::Cursor;

use anyhow::Context as _;
use image::{DynamicImage, ImageFormat};
use poise::serenity_prelude as serenity;

use inspector_core::{Context, Error};
use inspector_utils::embed::DEFAULT_EMBED_COLOR;

/// Largest avatar we are willing to decode.
const MAX_AVATAR_BYTES: usize = 8 * 1024 * 1024;
const BLUR_SIGMA: f32 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, poise::ChoiceParameter)]
pub enum AvatarFilter {
    #[name = "grayscale"]
    Grayscale,
    #[name = "invert"]
    Invert,
    #[name = "blur"]
    Blur,
    #[name = "flip"]
    Flip,
    #[name = "mirror"]
    Mirror,
}

/// Show a user's avatar, optionally run through an image filter.
#[poise::command(prefix_command, slash_command, category = "Media")]
pub async fn avatar(
    ctx: Context<'_>,
    #[description = "Whose avatar (defaults to you)"] user: Option<serenity::User>,
    #[description = "grayscale, invert, blur, flip or mirror"] filter: Option<AvatarFilter>,
) -> Result<(), Error> {
    let user = user.as_ref().unwrap_or_else(|| ctx.author());

    let Some(filter) = filter else {
        let embed = serenity::CreateEmbed::new()
            .title(format!("Avatar of {}", user.name))
            .color(DEFAULT_EMBED_COLOR)
            .url(user.face())
            .image(user.face());
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        return Ok(());
    };

    ctx.defer().await?;

    let response = ctx
        .data()
        .http_client
        .get(user.static_face())
        .send()
        .await?
        .error_for_status()?;
    let Some(bytes) = read_capped(response).await? else {
        ctx.say("That avatar is too large to process.").await?;
        return Ok(());
    };

    let png = tokio::task::spawn_blocking(move || render_filtered(&bytes, filter))
        .await
        .context("avatar filter task panicked")??;

    ctx.send(
        poise::CreateReply::default()
            .attachment(serenity::CreateAttachment::bytes(png, "avatar.png")),
    )
    .await?;

    Ok(())
}

pub fn apply_filter(image: DynamicImage, filter: AvatarFilter) -> DynamicImage {
    match filter {
        AvatarFilter::Grayscale => image.grayscale(),
        AvatarFilter::Invert => {
            let mut image = image;
            image.invert();
            image
        }
        AvatarFilter::Blur => image.blur(BLUR_SIGMA),
        AvatarFilter::Flip => image.flipv(),
        AvatarFilter::Mirror => image.fliph(),
    }
}

/// Decode, filter and re-encode as PNG. CPU bound; run off the async workers.
/// Body of `response`, or `None` as soon as it is known to be over
/// `MAX_AVATAR_BYTES`.
async fn read_capped(mut response: reqwest::Response) -> reqwest::Result<Option<Vec<u8>>> {
    if exceeds_avatar_limit(response.content_length()) {
        return Ok(None);
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        body.extend_from_slice(&chunk);
        if body.len() > MAX_AVATAR_BYTES {
            return Ok(None);
        }
    }
    Ok(Some(body))
}

fn exceeds_avatar_limit(content_length: Option<u64>) -> bool {
    content_length.is_some_and(|len| len > MAX_AVATAR_BYTES as u64)
}

fn render_filtered(bytes: &[u8], filter: AvatarFilter) -> anyhow::Result<Vec<u8>> {
    let decoded = image::load_from_memory(bytes).context("failed to decode avatar")?;
    let filtered = apply_filter(decoded, filter);

    let mut out = Cursor::new(Vec::new());
    filtered
        .write_to(&mut out, ImageFormat::Png)
        .context("failed to encode filtered avatar")?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};

    use super::{AvatarFilter, MAX_AVATAR_BYTES, apply_filter, exceeds_avatar_limit, render_filtered};

    fn sample() -> DynamicImage {
        let mut image = RgbaImage::new(2, 2);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([0, 255, 0, 255]));
        image.put_pixel(0, 1, Rgba([0, 0, 255, 255]));
        image.put_pixel(1, 1, Rgba([255, 255, 255, 255]));
        DynamicImage::ImageRgba8(image)
    }

    #[test]
    fn declared_length_is_checked_before_download() {
        let limit = MAX_AVATAR_BYTES as u64;
        assert!(!exceeds_avatar_limit(None));
        assert!(!exceeds_avatar_limit(Some(limit)));
        assert!(exceeds_avatar_limit(Some(limit + 1)));
        assert!(exceeds_avatar_limit(Some(u64::MAX)));
    }

    #[test]
    fn inverts_colors() {
        let inverted = apply_filter(sample(), AvatarFilter::Invert);
        assert_eq!(inverted.get_pixel(0, 0), Rgba([0, 255, 255, 255]));
        assert_eq!(inverted.get_pixel(1, 1), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn flips_and_mirrors() {
        let mirrored = apply_filter(sample(), AvatarFilter::Mirror);
        assert_eq!(mirrored.get_pixel(0, 0), Rgba([0, 255, 0, 255]));

        let flipped = apply_filter(sample(), AvatarFilter::Flip);
        assert_eq!(flipped.get_pixel(0, 0), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn grayscale_keeps_dimensions() {
        let gray = apply_filter(sample(), AvatarFilter::Grayscale);
        assert_eq!(gray.dimensions(), (2, 2));
        let pixel = gray.to_rgba8().get_pixel(1, 1).0;
        assert_eq!(pixel[0], pixel[1]);
        assert_eq!(pixel[1], pixel[2]);
    }

    #[test]
    fn renders_png_round_trip() {
        let mut encoded = std::io::Cursor::new(Vec::new());
        sample()
            .write_to(&mut encoded, image::ImageFormat::Png)
            .unwrap();

        let png = render_filtered(encoded.get_ref(), AvatarFilter::Blur).unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));

        assert!(render_filtered(b"not an image", AvatarFilter::Blur).is_err());
    }
}
