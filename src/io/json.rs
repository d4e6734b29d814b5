//! JSON 存档的读写: 外层信封交给 serde, 逐字段校验遗留 CSV 记录。
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::net::core::PetriNet;
use crate::net::error::NetError;

/// On-disk envelope: three arrays of legacy comma-separated records,
/// `"P0,caption,x,y,tokens"`, `"T0,caption,x,y,angle"` and
/// `"fromKey,toKey,duration"`.
#[derive(Debug, Serialize, Deserialize)]
struct NetFile {
    places: Vec<String>,
    transitions: Vec<String>,
    arcs: Vec<String>,
}

impl PetriNet {
    pub fn save(&self, path: &Path) -> Result<(), NetError> {
        fs::write(path, self.save_to_string()?)?;
        Ok(())
    }

    pub fn save_to_string(&self) -> Result<String, NetError> {
        if self.is_empty() {
            return Err(NetError::EmptyNet);
        }
        let file = NetFile {
            places: self
                .places()
                .iter()
                .map(|p| format!("{},{},{},{},{}", p.key(), p.caption, p.x, p.y, p.tokens))
                .collect(),
            transitions: self
                .transitions()
                .iter()
                .map(|t| format!("{},{},{},{},{}", t.key(), t.caption, t.x, t.y, t.angle))
                .collect(),
            arcs: self
                .arcs()
                .iter()
                .map(|a| format!("{},{},{}", a.from.key(), a.to.key(), a.duration))
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Loads a net from a file, replacing the current content. Partial
    /// progress from a malformed file is rolled back: the net ends cleared.
    pub fn load(&mut self, path: &Path) -> Result<(), NetError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => return Err(err.into()),
        };
        self.load_from_str(&text)
    }

    pub fn load_from_str(&mut self, text: &str) -> Result<(), NetError> {
        let result = self.fill_from_str(text);
        if result.is_err() {
            self.clear();
        }
        result
    }

    fn fill_from_str(&mut self, text: &str) -> Result<(), NetError> {
        let file: NetFile = serde_json::from_str(text)?;
        self.clear();

        for record in &file.places {
            let (id, caption, x, y, last) = split_node_record("place", record, b'P')?;
            let tokens = field(record, "place", &last)?;
            if id as usize != self.places().len() {
                return Err(malformed("place", record, "ids shall be dense and in order"));
            }
            self.add_place_with_id(id, &caption, x, y, tokens);
        }

        for record in &file.transitions {
            let (id, caption, x, y, last) = split_node_record("transition", record, b'T')?;
            let angle = field(record, "transition", &last)?;
            if id as usize != self.transitions().len() {
                return Err(malformed("transition", record, "ids shall be dense and in order"));
            }
            self.add_transition_with_id(id, &caption, x, y, angle);
        }

        for record in &file.arcs {
            let words: Vec<&str> = record.split(',').collect();
            if words.len() != 3 {
                return Err(malformed("arc", record, "expected 3 fields"));
            }
            let from = self.find_node(words[0])?;
            let to = self.find_node(words[1])?;
            let duration: f32 = field(record, "arc", words[2])?;
            if duration < 0.0 {
                return Err(NetError::NegativeDuration(duration));
            }
            self.add_arc(from, to, duration)?;
        }

        self.modified = false;
        Ok(())
    }
}

fn malformed(record: &'static str, text: &str, reason: &str) -> NetError {
    NetError::Malformed {
        record,
        text: text.to_string(),
        reason: reason.to_string(),
    }
}

fn field<T: std::str::FromStr>(record: &str, kind: &'static str, word: &str) -> Result<T, NetError> {
    word.parse()
        .map_err(|_| malformed(kind, record, &format!("bad field '{word}'")))
}

fn split_node_record(
    kind: &'static str,
    record: &str,
    prefix: u8,
) -> Result<(u32, String, f32, f32, String), NetError> {
    let words: Vec<&str> = record.split(',').collect();
    if words.len() != 5 {
        return Err(malformed(kind, record, "expected 5 fields"));
    }
    if words[0].as_bytes().first() != Some(&prefix) {
        return Err(malformed(kind, record, "wrong key prefix"));
    }
    let id = field(record, kind, &words[0][1..])?;
    let x = field(record, kind, words[2])?;
    let y = field(record, kind, words[3])?;
    Ok((id, words[1].to_string(), x, y, words[4].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::structure::NodeRef::{Place as P, Transition as T};

    fn sample() -> PetriNet {
        let mut net = PetriNet::default();
        let p0 = net.add_place(10.0, 20.0, 3);
        let t0 = net.add_transition(30.0, 40.0);
        net.place_mut(p0).unwrap().caption = "buffer".to_string();
        net.add_arc(P(p0), T(t0), 0.0).unwrap();
        net.add_arc(T(t0), P(p0), 2.5).unwrap();
        net
    }

    #[test]
    fn refuses_to_save_an_empty_net() {
        let net = PetriNet::default();
        assert!(matches!(net.save_to_string(), Err(NetError::EmptyNet)));
    }

    #[test]
    fn roundtrip_is_isomorphic() {
        let net = sample();
        let text = net.save_to_string().unwrap();

        let mut loaded = PetriNet::default();
        loaded.load_from_str(&text).unwrap();
        assert!(!loaded.modified);
        assert_eq!(loaded.places().len(), 1);
        assert_eq!(loaded.transitions().len(), 1);
        assert_eq!(loaded.arcs().len(), 2);

        let place = loaded.places().iter().next().unwrap();
        assert_eq!(place.caption, "buffer");
        assert_eq!((place.x, place.y), (10.0, 20.0));
        assert_eq!(place.tokens, 3);
        for (original, copy) in net.arcs().iter().zip(loaded.arcs()) {
            assert_eq!(original, copy);
        }
    }

    #[test]
    fn malformed_record_clears_the_net() {
        let mut net = sample();
        let err = net
            .load_from_str(r#"{"places": ["P0,only,three"], "transitions": [], "arcs": []}"#)
            .unwrap_err();
        assert!(matches!(err, NetError::Malformed { record: "place", .. }));
        assert!(net.is_empty());
    }

    #[test]
    fn missing_brace_is_a_parse_failure() {
        let mut net = PetriNet::default();
        let err = net
            .load_from_str(r#""places": ["P0,P0,0,0,0"]"#)
            .unwrap_err();
        assert!(matches!(err, NetError::Json(_)));
    }

    #[test]
    fn negative_durations_are_rejected() {
        let mut net = PetriNet::default();
        let err = net
            .load_from_str(
                r#"{"places": ["P0,P0,0,0,1"],
                    "transitions": ["T0,T0,5,5,0"],
                    "arcs": ["T0,P0,-2"]}"#,
            )
            .unwrap_err();
        assert!(matches!(err, NetError::NegativeDuration(_)));
        assert!(net.is_empty());
    }

    #[test]
    fn arcs_to_unknown_nodes_are_rejected() {
        let mut net = PetriNet::default();
        let err = net
            .load_from_str(
                r#"{"places": ["P0,P0,0,0,1"], "transitions": [], "arcs": ["P0,T7,0"]}"#,
            )
            .unwrap_err();
        assert!(matches!(err, NetError::UnknownNode(_)));
    }
}
