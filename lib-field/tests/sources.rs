use hashbrown::HashMap;
use lib_field::{Field2D, MapDef, SourceError, source};

#[test]
fn csv_with_comments() {
    let text = "# level 1\n0, 0, 1\n\n0 2 1\n1,1,1\n";
    let field = Field2D::from_csv(text, 16, 16).unwrap();
    assert_eq!(field.width(), 3);
    assert_eq!(field.height(), 3);
    assert_eq!(field.tile_type(1, 1), 2);
    assert_eq!(field.tile_type(2, 0), 1);
}

#[test]
fn csv_errors_point_at_the_line() {
    let err = source::parse_csv("0,0\n0,x\n").unwrap_err();
    assert!(
        matches!(err, SourceError::BadToken { line: 2, column: 2, ref token } if token == "x"),
        "{err}"
    );

    let err = source::parse_csv("0,0\n0\n").unwrap_err();
    assert!(matches!(
        err,
        SourceError::Ragged {
            line: 2,
            expected: 2,
            found: 1
        }
    ));

    assert!(matches!(
        source::parse_csv("# nothing\n"),
        Err(SourceError::Empty)
    ));
}

#[test]
fn char_map() {
    let mapping = HashMap::from([('.', 0), ('#', 1), ('~', 2)]);
    let text = "#####\n#..~#\n#####\n";
    let field = Field2D::from_char_map(text, &mapping, 32, 32).unwrap();
    assert_eq!(field.width(), 5);
    assert_eq!(field.tile_type(3, 1), 2);
    assert_eq!(field.tile_type(0, 0), 1);

    let err = Field2D::from_char_map("#?#\n", &mapping, 32, 32).unwrap_err();
    assert!(matches!(
        err,
        SourceError::UnknownChar {
            line: 1,
            column: 2,
            ch: '?'
        }
    ));
}

#[test]
fn ron_definition() {
    let text = r#"(
        width: 2,
        height: 2,
        tile_width: 32,
        tile_height: 32,
        tiles: [0, 1, 1, 0],
        limit: [1],
    )"#;
    let def = MapDef::from_ron(text).unwrap();
    assert!(def.allow_move.is_empty());

    let field = def.clone().into_field().unwrap();
    assert!(!field.is_hit(1, 0));
    assert!(field.is_hit(0, 0));
    assert_eq!(field.to_def(), def);

    let encoded = def.to_ron().unwrap();
    assert_eq!(MapDef::from_ron(&encoded).unwrap(), def);
}

#[test]
fn ron_definition_is_validated() {
    let text = "(width: 2, height: 2, tile_width: 32, tile_height: 32, tiles: [0])";
    let err = MapDef::from_ron(text).unwrap().into_field().unwrap_err();
    assert!(matches!(err, SourceError::Field(_)), "{err}");
    assert!(matches!(
        MapDef::from_ron("(width: 2"),
        Err(SourceError::Decode(_))
    ));
}
