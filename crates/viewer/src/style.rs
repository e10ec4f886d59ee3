pub(crate) const PAGE_CSS: &str = r#"
    * { margin: 0; padding: 0; box-sizing: border-box; }

    body {
      font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, sans-serif;
      background: #0a0a0a;
      color: #ffffff;
      padding: 20px;
    }

    .container { max-width: 1400px; margin: 0 auto; }

    h1 {
      font-size: 2.5rem;
      margin-bottom: 10px;
      background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
      -webkit-background-clip: text;
      -webkit-text-fill-color: transparent;
    }

    .stats { color: #888; margin-bottom: 30px; font-size: 1.1rem; }
    .playlists { display: grid; gap: 20px; }

    .playlist {
      background: #1a1a1a;
      border-radius: 12px;
      padding: 20px;
      border: 1px solid #333;
    }

    .playlist-header {
      display: flex;
      gap: 20px;
      margin-bottom: 20px;
      cursor: pointer;
      align-items: center;
    }

    .playlist-cover {
      width: 120px;
      height: 120px;
      border-radius: 8px;
      object-fit: cover;
      background: #333;
      flex-shrink: 0;
    }

    .playlist-info { flex: 1; }
    .playlist-name { font-size: 1.8rem; font-weight: bold; margin-bottom: 8px; }
    .playlist-meta { color: #888; margin-bottom: 8px; }
    .playlist-description { color: #aaa; font-size: 0.95rem; line-height: 1.5; }

    .tracks { display: none; border-top: 1px solid #333; padding-top: 20px; }
    .tracks.show { display: block; }

    .track {
      display: grid;
      grid-template-columns: 40px 50px 1fr 2fr 2fr 80px;
      gap: 15px;
      padding: 10px;
      align-items: center;
      border-radius: 6px;
      transition: background 0.2s;
    }

    .track:hover { background: #252525; }
    .track-pos { color: #666; text-align: right; }

    .track-cover {
      width: 40px;
      height: 40px;
      border-radius: 4px;
      object-fit: cover;
      background: #333;
    }

    .track-title { font-weight: 500; }
    .track-artist { color: #aaa; }
    .track-album { color: #888; font-size: 0.9rem; }
    .track-duration { color: #666; text-align: right; }

    .explicit {
      background: #666;
      color: #fff;
      padding: 2px 6px;
      border-radius: 3px;
      font-size: 0.7rem;
      font-weight: bold;
      display: inline-block;
      margin-left: 6px;
    }

    @media (max-width: 768px) {
      .track { grid-template-columns: 30px 40px 1fr 60px; gap: 10px; }
      .track-artist, .track-album { display: none; }
    }
"#;

pub(crate) const TOGGLE_SCRIPT: &str = r#"
    function togglePlaylist(idx) {
      document.getElementById('tracks-' + idx).classList.toggle('show');
    }
"#;
