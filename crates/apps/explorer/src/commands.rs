use foundation::geo::LatLon;
use foundation::ids::EntityId;
use layers::SurfaceEvent;
use session::Input;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Send(Input),
    Species,
    Neighborhoods,
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  species           list species with tree counts
  neighborhoods     list neighborhoods with tree counts
  category [NAME]   filter by species (no name clears)
  group [NAME]      filter by neighborhood (no name clears)
  search [TEXT]     type an address query (no text clears)
  choose N          pick address candidate N
  locate            fly to the device position
  pick ID           select a tree
  dismiss | more | close
  only-category     show only the selected tree's species
  only-group        show only the selected tree's neighborhood
  status | help | quit";

/// Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let optional = |s: &str| (!s.is_empty()).then(|| s.to_string());

    let command = match word {
        "category" => Command::Send(Input::SetCategory(optional(rest))),
        "group" => Command::Send(Input::SetGroup(optional(rest))),
        "search" => Command::Send(Input::SetAddressQuery(rest.to_string())),
        "choose" => {
            let n: usize = rest
                .parse()
                .map_err(|_| format!("choose expects a candidate number, got {rest:?}"))?;
            if n == 0 {
                return Err("candidates are numbered from 1".to_string());
            }
            Command::Send(Input::ChooseCandidate(n - 1))
        }
        "locate" => Command::Send(Input::Locate),
        "pick" => {
            let id: u64 = rest
                .parse()
                .map_err(|_| format!("pick expects a tree id, got {rest:?}"))?;
            Command::Send(Input::Surface(SurfaceEvent::Pick(EntityId(id))))
        }
        "dismiss" => Command::Send(Input::Dismiss),
        "more" => Command::Send(Input::ShowMore),
        "close" => Command::Send(Input::CloseSelection),
        "only-category" => Command::Send(Input::ShowOnlyCategory),
        "only-group" => Command::Send(Input::ShowOnlyGroup),
        "species" => Command::Species,
        "neighborhoods" => Command::Neighborhoods,
        "status" => Command::Status,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(Some(command))
}

/// Parses `"lat,lon"`.
pub fn parse_lat_lon(s: &str) -> Result<LatLon, String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got {s:?}"))?;
    let lat: f64 = lat.trim().parse().map_err(|_| format!("invalid latitude {lat:?}"))?;
    let lon: f64 = lon.trim().parse().map_err(|_| format!("invalid longitude {lon:?}"))?;
    let position = LatLon::new(lat, lon);
    if !position.is_valid() {
        return Err(format!("position out of range: {lat}, {lon}"));
    }
    Ok(position)
}

#[cfg(test)]
mod tests {
    use super::{Command, parse, parse_lat_lon};
    use foundation::{EntityId, LatLon};
    use layers::SurfaceEvent;
    use pretty_assertions::assert_eq;
    use session::Input;

    #[test]
    fn parses_filters_with_and_without_values() {
        assert_eq!(
            parse("category  Quercus agrifolia ").unwrap(),
            Some(Command::Send(Input::SetCategory(Some("Quercus agrifolia".into()))))
        );
        assert_eq!(parse("group").unwrap(), Some(Command::Send(Input::SetGroup(None))));
        assert_eq!(parse("   ").unwrap(), None);
        assert_eq!(parse("species").unwrap(), Some(Command::Species));
        assert_eq!(parse("neighborhoods").unwrap(), Some(Command::Neighborhoods));
    }

    #[test]
    fn numbered_arguments() {
        assert_eq!(parse("choose 2").unwrap(), Some(Command::Send(Input::ChooseCandidate(1))));
        assert!(parse("choose 0").is_err());
        assert_eq!(
            parse("pick 42").unwrap(),
            Some(Command::Send(Input::Surface(SurfaceEvent::Pick(EntityId(42)))))
        );
        assert!(parse("pick oak").is_err());
        assert!(parse("fly").is_err());
    }

    #[test]
    fn lat_lon_argument() {
        assert_eq!(parse_lat_lon("37.77, -122.42"), Ok(LatLon::new(37.77, -122.42)));
        assert!(parse_lat_lon("37.77").is_err());
        assert!(parse_lat_lon("97,0").is_err());
    }
}
