//! # Quire CLI
//!
//! Usage:
//!   quire input.json -o layout.json
//!   echo '{ ... }' | quire --hit 134,106
//!   quire --example > document.json

use std::env;
use std::fs;
use std::io::{self, Read};

use quire::model::{Document, Point};
use quire::LayoutEngine;

fn main() {
    let args: Vec<String> = env::args().collect();

    // Handle --example flag
    if args.iter().any(|a| a == "--example") {
        print!("{}", example_document_json());
        return;
    }

    // Read input
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1]).expect("Failed to read input file")
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).expect("Failed to read stdin");
        buf
    };

    let document: Document = match serde_json::from_str(&input) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("✗ Failed to parse document: {}", e);
            std::process::exit(1);
        }
    };

    let tree = match LayoutEngine::new().layout(&document) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    };

    // Parse an optional hit-test point: --hit X,Y
    let hit = args
        .windows(2)
        .find(|w| w[0] == "--hit")
        .and_then(|w| parse_point(&w[1]))
        .map(|point| quire::hit::locate(&document, &tree, point));

    let output = serde_json::json!({
        "layout": tree,
        "hit": hit,
    });
    let pretty = serde_json::to_string_pretty(&output).expect("Failed to serialize output");

    // Parse output path
    match args.windows(2).find(|w| w[0] == "-o").map(|w| w[1].clone()) {
        Some(path) => {
            fs::write(&path, &pretty).expect("Failed to write output");
            eprintln!("✓ Written {} bytes to {}", pretty.len(), path);
        }
        None => println!("{}", pretty),
    }
}

fn parse_point(raw: &str) -> Option<Point> {
    let (x, y) = raw.split_once(',')?;
    Some(Point::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
}

fn example_document_json() -> &'static str {
    r##"{
  "pages": [
    [
      {
        "atoms": [
          { "kind": { "type": "Text", "value": "H" }, "metrics": { "width": 11, "height": 16 } },
          { "kind": { "type": "Text", "value": "i" }, "metrics": { "width": 5, "height": 16 } },
          { "kind": { "type": "Image", "display": "Inline" }, "metrics": { "width": 24, "height": 18 } }
        ],
        "width": 40,
        "height": 24,
        "ascent": 18,
        "flex": "Start",
        "startIndex": 0
      },
      {
        "atoms": [
          {
            "kind": {
              "type": "Table",
              "rows": [
                {
                  "id": "r1",
                  "cells": [
                    {
                      "id": "c1",
                      "x": 0, "y": 0, "width": 180, "height": 40,
                      "rows": [
                        {
                          "atoms": [
                            { "kind": { "type": "Text", "value": "a" }, "metrics": { "width": 9, "height": 14 } },
                            { "kind": { "type": "Text", "value": "b" }, "metrics": { "width": 9, "height": 14 } }
                          ],
                          "width": 18,
                          "height": 20,
                          "ascent": 14,
                          "flex": "Start",
                          "startIndex": 0
                        }
                      ]
                    }
                  ]
                }
              ]
            },
            "metrics": { "width": 180, "height": 40 },
            "id": "t1"
          }
        ],
        "width": 180,
        "height": 40,
        "ascent": 40,
        "flex": "Start",
        "startIndex": 3
      }
    ]
  ],
  "margins": { "top": 60, "right": 60, "bottom": 60, "left": 60 },
  "innerWidth": 475,
  "scale": 1.0,
  "cellPadding": 5,
  "pageNo": 0,
  "readOnly": false
}
"##
}
