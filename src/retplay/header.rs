//! The RetPlay page and its header bar.

/// FNC corporate blue used for the header background.
pub const FNC_BLUE: &str = "#002b49";

#[derive(Debug, Clone, PartialEq)]
pub struct Logo {
    pub src: String,
    pub height_px: u32,
}

/// Navigation bar across the top of the page: brand text on the left, logos on the right.
#[derive(Debug, Clone, PartialEq)]
pub struct RetPlayHeader {
    pub brand: String,
    pub brand_font_size: u32,
    pub colour: String,
    pub logos: Vec<Logo>,
    pub spacer_px: u32,
}

impl Default for RetPlayHeader {
    fn default() -> Self {
        Self {
            brand: "RetPlay".to_string(),
            brand_font_size: 40,
            colour: FNC_BLUE.to_string(),
            logos: vec![
                Logo {
                    src: "assets/images/retplaylogowhite.png".to_string(),
                    height_px: 75,
                },
                Logo {
                    src: "assets/images/fnc_png.png".to_string(),
                    height_px: 75,
                },
            ],
            spacer_px: 10,
        }
    }
}

impl RetPlayHeader {
    pub fn render(&self) -> String {
        let spacer = format!("<div style=\"width: {}px\"></div>", self.spacer_px);
        let logos: Vec<String> = self
            .logos
            .iter()
            .map(|logo| format!("<img src=\"{}\" style=\"height: {}px\">", logo.src, logo.height_px))
            .collect();

        format!(
            "<nav id=\"Header\" class=\"navbar navbar-dark\" style=\"background-color: {colour}; display: flex; \
             align-items: center; justify-content: space-between; padding: 8px 16px;\">\
             <span class=\"navbar-brand\" style=\"font-size: {size}px; color: white;\">{brand}</span>\
             <div style=\"display: flex; align-items: center;\">{logos}</div></nav>",
            colour = self.colour,
            size = self.brand_font_size,
            brand = self.brand,
            logos = logos.join(&spacer),
        )
    }
}

const PLAYER_SCRIPT: &str = r##"
const canvas = document.getElementById("map");
const ctx = canvas.getContext("2d");
const slider = document.getElementById("step");
const label = document.getElementById("step-label");
const colours = { FRIENDLY: "#1f77b4", HOSTILE: "#d62728", NEUTRAL: "#2ca02c", UNKNOWN: "#ffbf00" };
let playback = null;

function draw(index) {
  const size = playback.initial_data.map_size;
  const step = playback.step_data[index];
  const agents = step ? step.agents : playback.initial_data.agents;
  const sx = canvas.width / (size.x_max - size.x_min || 1);
  const sy = canvas.height / (size.y_max - size.y_min || 1);
  ctx.clearRect(0, 0, canvas.width, canvas.height);
  for (const agent of agents) {
    const pos = agent.pos;
    const x = (pos[0] - size.x_min) * sx;
    const y = canvas.height - (pos[1] - size.y_min) * sy;
    ctx.fillStyle = agent.killed ? "#7f7f7f" : (colours[agent.affiliation] || "#000");
    ctx.beginPath();
    ctx.arc(x, y, 5, 0, 2 * Math.PI);
    ctx.fill();
    ctx.fillText(agent.name, x + 7, y - 7);
  }
  label.textContent = step ? `Step ${step.step_number} (${step.time})` : "Start";
}

fetch("api/playback").then(r => r.json()).then(data => {
  playback = data;
  slider.max = Math.max(playback.step_data.length - 1, 0);
  slider.addEventListener("input", () => draw(Number(slider.value)));
  draw(0);
});
"##;

/// The whole playback page.
pub fn render_page(header: &RetPlayHeader, title: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{title}</title></head>\
         <body style=\"margin: 0; font-family: sans-serif;\">{header}\
         <main style=\"padding: 16px;\"><canvas id=\"map\" width=\"800\" height=\"800\" \
         style=\"border: 1px solid #ccc;\"></canvas>\
         <div><input id=\"step\" type=\"range\" min=\"0\" value=\"0\" style=\"width: 800px;\">\
         <span id=\"step-label\"></span></div></main>\
         <script>{script}</script></body></html>",
        title = title,
        header = header.render(),
        script = PLAYER_SCRIPT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_defaults() {
        let header = RetPlayHeader::default();
        assert_eq!(header.brand, "RetPlay");
        assert_eq!(header.brand_font_size, 40);
        assert_eq!(header.colour, FNC_BLUE);

        let html = header.render();
        assert!(html.contains("id=\"Header\""));
        assert!(html.contains("font-size: 40px"));
        assert!(html.find("retplaylogowhite.png") < html.find("fnc_png.png"));
        assert!(html.contains("<div style=\"width: 10px\"></div>"));
    }

    #[test]
    fn test_page_embeds_header() {
        let page = render_page(&RetPlayHeader::default(), "RetPlay - run 1");
        assert!(page.contains("<title>RetPlay - run 1</title>"));
        assert!(page.contains("api/playback"));
        assert!(page.contains("const colours"));
        assert!(page.contains("HOSTILE: \"#d62728\""));
        assert!(page.trim_end().ends_with("</script></body></html>"));
    }
}
