use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

const TIDAL_IMAGE_HOST: &str = "https://resources.tidal.com/images";
const TIDAL_COVER_SIZE: &str = "1280x1280";

/// Turns an opaque cover id (`abc-def-ghi`) into its CDN image path (`abc/def/ghi`).
pub fn cover_path(cover_id: &str) -> String {
    cover_id.replace('-', "/")
}

pub fn tidal_cover_url(cover_id: &str) -> String {
    format!(
        "{TIDAL_IMAGE_HOST}/{}/{TIDAL_COVER_SIZE}.jpg",
        cover_path(cover_id)
    )
}

pub fn tidal_track_search_url(
    api_base: &str,
    artist: &str,
    title: &str,
    limit: u32,
    country_code: &str,
) -> String {
    let q = format!("{} {}", artist, title);
    let encoded = utf8_percent_encode(&q, NON_ALPHANUMERIC).to_string();
    format!(
        "{}/search/tracks?query={encoded}&limit={limit}&countryCode={country_code}",
        api_base.trim_end_matches('/')
    )
}

pub fn itunes_album_search_url(api_base: &str, artist: &str, album: &str) -> String {
    let q = format!("{} {}", artist, album);
    let encoded = utf8_percent_encode(&q, NON_ALPHANUMERIC).to_string();
    format!(
        "{}/search?term={encoded}&entity=album&limit=1",
        api_base.trim_end_matches('/')
    )
}

/// iTunes only advertises a 100px thumbnail; the same path serves 600px.
pub fn upscale_itunes_artwork(url: &str) -> String {
    url.replace("100x100", "600x600")
}

#[cfg(test)]
mod tests {
    use super::{
        cover_path, itunes_album_search_url, tidal_cover_url, tidal_track_search_url,
        upscale_itunes_artwork,
    };

    #[test]
    fn cover_id_dashes_become_path_segments() {
        assert_eq!(cover_path("abc-def-ghi"), "abc/def/ghi");
        assert_eq!(
            tidal_cover_url("abc-def-ghi"),
            "https://resources.tidal.com/images/abc/def/ghi/1280x1280.jpg"
        );
    }

    #[test]
    fn url_builder_encodes_queries() {
        let tidal = tidal_track_search_url("https://api.tidal.com/v1/", "AC/DC", "Back In Black", 5, "US");
        let itunes = itunes_album_search_url("https://itunes.apple.com", "Daft Punk", "Discovery");

        assert_eq!(
            tidal,
            "https://api.tidal.com/v1/search/tracks?query=AC%2FDC%20Back%20In%20Black&limit=5&countryCode=US"
        );
        assert!(itunes.contains("term=Daft%20Punk%20Discovery&entity=album&limit=1"));
    }

    #[test]
    fn itunes_artwork_is_upscaled() {
        assert_eq!(
            upscale_itunes_artwork("https://is1.mzstatic.com/a/100x100bb.jpg"),
            "https://is1.mzstatic.com/a/600x600bb.jpg"
        );
    }
}
